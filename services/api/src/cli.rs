use crate::demo::{
    run_demo, run_module_validation, run_normalize, run_wellness_report, DemoArgs,
    ModuleValidateArgs, NormalizeArgs, WellnessReportArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use mindful_horizon::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "MindfulHorizon Wellness Engine",
    about = "Score assessments and recommend interventions from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score assessment history offline
    Wellness {
        #[command(subcommand)]
        command: WellnessCommand,
    },
    /// Inspect the intervention module catalog
    Modules {
        #[command(subcommand)]
        command: ModulesCommand,
    },
    /// Walk a sample user through intake, scoring, and module completion
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum WellnessCommand {
    /// Build a wellness report from an assessment history CSV export
    Report(WellnessReportArgs),
    /// Normalize a single raw score onto the 0-10 wellness scale
    Normalize(NormalizeArgs),
}

#[derive(Subcommand, Debug)]
enum ModulesCommand {
    /// Check a module completion order against the progression table
    Validate(ModuleValidateArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Wellness {
            command: WellnessCommand::Report(args),
        } => run_wellness_report(args),
        Command::Wellness {
            command: WellnessCommand::Normalize(args),
        } => run_normalize(args),
        Command::Modules {
            command: ModulesCommand::Validate(args),
        } => {
            run_module_validation(args);
            Ok(())
        }
        Command::Demo(args) => run_demo(args),
    }
}
