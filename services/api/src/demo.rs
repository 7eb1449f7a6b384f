use crate::infra::{
    end_of_day, parse_date, parse_module_id, InMemoryAssessmentRepository,
    InMemoryCompletionPublisher,
};
use chrono::{Duration, NaiveDate, Utc};
use clap::Args;
use mindful_horizon::config::{AppConfig, WellnessConfig};
use mindful_horizon::error::AppError;
use mindful_horizon::wellness::{
    build_report, normalize, validate_sequence, AssessmentHistoryImporter, AssessmentSubmission,
    AssessmentType, InterventionModule, ModuleCompletionSet, ModuleId, Recommendation,
    RecommendationEngine, UserId, WellnessReport, WellnessService,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct WellnessReportArgs {
    /// Assessment history CSV export (Assessment Type,Score,Taken At)
    #[arg(long)]
    pub(crate) history: PathBuf,
    /// Completed module ids, comma separated
    #[arg(long, value_delimiter = ',', value_parser = parse_module_id)]
    pub(crate) completed: Vec<ModuleId>,
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Trailing window in days. Defaults to the configured window.
    #[arg(long)]
    pub(crate) window_days: Option<u32>,
}

#[derive(Args, Debug)]
pub(crate) struct NormalizeArgs {
    /// Instrument name, e.g. "GAD-7", "PHQ-9", "Daily Mood"
    #[arg(long)]
    pub(crate) assessment_type: String,
    /// Raw score on the instrument's own scale
    #[arg(long)]
    pub(crate) score: f64,
}

#[derive(Args, Debug)]
pub(crate) struct ModuleValidateArgs {
    /// Module ids in completion order
    #[arg(value_parser = parse_module_id, required = true)]
    pub(crate) modules: Vec<ModuleId>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Optional history CSV to seed the demo user instead of sample data
    #[arg(long)]
    pub(crate) history: Option<PathBuf>,
}

pub(crate) fn run_wellness_report(args: WellnessReportArgs) -> Result<(), AppError> {
    let WellnessReportArgs {
        history,
        completed,
        as_of,
        window_days,
    } = args;

    let config = AppConfig::load()?;
    let window_days = window_days
        .filter(|days| *days > 0)
        .unwrap_or(config.wellness.window_days);
    let as_of = end_of_day(as_of.unwrap_or_else(|| Utc::now().date_naive()));

    let records = AssessmentHistoryImporter::from_path(&history)?;
    let completed: ModuleCompletionSet = completed.into_iter().collect();
    let engine = RecommendationEngine::new(config.wellness.thresholds);
    let report = build_report(&engine, &records, &completed, as_of, window_days);

    println!(
        "Wellness report for {} ({} records imported)",
        history.display(),
        records.len()
    );
    render_wellness_report(&report);
    Ok(())
}

pub(crate) fn run_normalize(args: NormalizeArgs) -> Result<(), AppError> {
    let value = normalize(&args.assessment_type, args.score)?;
    println!(
        "{} {} -> {:.2} on the 0-10 wellness scale",
        args.assessment_type.trim(),
        args.score,
        value
    );
    Ok(())
}

pub(crate) fn run_module_validation(args: ModuleValidateArgs) {
    for pair in args.modules.windows(2) {
        println!("- {} -> {}", module_label(pair[0]), module_label(pair[1]));
    }

    if validate_sequence(&args.modules) {
        println!("Sequence is valid");
    } else {
        println!("Sequence breaks the module progression");
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { as_of, history } = args;
    let as_of = end_of_day(as_of.unwrap_or_else(|| Utc::now().date_naive()));

    let repository = Arc::new(InMemoryAssessmentRepository::default());
    let publisher = Arc::new(InMemoryCompletionPublisher::default());
    let service = WellnessService::new(
        repository.clone(),
        publisher.clone(),
        WellnessConfig::default(),
    );
    let user = UserId("demo-student".to_string());

    println!("MindfulHorizon wellness demo");
    match history {
        Some(path) => {
            let records = AssessmentHistoryImporter::from_path(&path)?;
            println!("- Seeded {} records from {}", records.len(), path.display());
            repository.seed(&user, records);
        }
        None => {
            let submissions = sample_submissions(as_of.date_naive());
            println!("- Logging {} sample assessments", submissions.len());
            for submission in submissions {
                match service.log_assessment(&user, submission, as_of) {
                    Ok(view) => println!(
                        "  {} {} on {} -> {:.1}",
                        view.assessment_type,
                        view.raw_score,
                        view.taken_at.date_naive(),
                        view.normalized_score
                    ),
                    Err(err) => println!("  Assessment rejected: {err}"),
                }
            }
        }
    }

    match service.wellness(&user, as_of) {
        Ok(view) => println!(
            "\nWellness score {:.1} from {} records in the last {} days",
            view.wellness_score, view.records_in_window, view.window_days
        ),
        Err(err) => println!("\nWellness score unavailable: {err}"),
    }

    println!("\nIntervention walkthrough");
    for _ in 0..3 {
        let recommendation = match service.recommendation(&user, as_of) {
            Ok(recommendation) => recommendation,
            Err(err) => {
                println!("  Recommendation unavailable: {err}");
                return Ok(());
            }
        };
        print_recommendation(&recommendation);

        if recommendation.module() == Some(InterventionModule::CrisisManagement) {
            println!("  Crisis path engaged; stopping the walkthrough");
            break;
        }
        match service.complete_module(&user, recommendation.module_id, as_of) {
            Ok(view) => println!(
                "  Completed {} ({} modules total)",
                view.module_name, view.total_completed
            ),
            Err(err) => println!("  Completion failed: {err}"),
        }
    }

    let events = publisher.events();
    println!("\nCompletion events dispatched: {}", events.len());

    match service.report(&user, as_of) {
        Ok(report) => {
            println!();
            render_wellness_report(&report);
        }
        Err(err) => println!("Report unavailable: {err}"),
    }

    Ok(())
}

/// Four weekly check-ins with anxiety easing from severe to moderate.
fn sample_submissions(as_of: NaiveDate) -> Vec<AssessmentSubmission> {
    let weekly = [
        (28, 17.0, 16.0, 2.0),
        (21, 15.0, 13.0, 2.0),
        (14, 12.0, 11.0, 3.0),
        (7, 11.0, 8.0, 3.0),
    ];

    weekly
        .iter()
        .flat_map(|(days_back, gad7, phq9, mood)| {
            let taken_at = Some(end_of_day(as_of - Duration::days(*days_back)) - Duration::hours(14));
            [
                (AssessmentType::Gad7, *gad7),
                (AssessmentType::Phq9, *phq9),
                (AssessmentType::DailyMood, *mood),
            ]
            .into_iter()
            .map(move |(kind, raw_score)| AssessmentSubmission {
                assessment_type: kind.label().to_string(),
                raw_score,
                taken_at,
                crisis_indicator: false,
            })
        })
        .collect()
}

fn module_label(id: ModuleId) -> String {
    match InterventionModule::from_id(id) {
        Some(module) => format!("{} ({})", module.label(), id),
        None => format!("unknown module {id}"),
    }
}

fn print_recommendation(recommendation: &Recommendation) {
    println!(
        "- [{}] {}: {}",
        recommendation.priority.label(),
        recommendation.module_name,
        recommendation.reason
    );
}

pub(crate) fn render_wellness_report(report: &WellnessReport) {
    println!("Evaluated {}", report.as_of.date_naive());

    println!("\nLatest scores");
    if report.latest.scores.is_empty() {
        println!("- none recorded");
    }
    for (kind, raw) in &report.latest.scores {
        println!("- {kind}: {raw}");
    }
    if report.latest.crisis_indicator {
        println!("- crisis indicator reported");
    }

    println!(
        "\nWellness score {:.1} ({} records, {}-day window)",
        report.current.wellness_score, report.current.records_in_window, report.current.window_days
    );
    match (report.previous_week_score, report.trend_delta) {
        (Some(previous), Some(delta)) => println!(
            "Trend: {} ({:+.1} vs {:.1} a week earlier)",
            report.trend.label(),
            delta,
            previous
        ),
        _ => println!("Trend: {}", report.trend.label()),
    }

    if report.completed_modules.is_empty() {
        println!("\nCompleted modules: none");
    } else {
        println!("\nCompleted modules");
        for id in report.completed_modules.iter() {
            println!("- {}", module_label(id));
        }
    }

    println!("\nRecommendation");
    print_recommendation(&report.recommendation);
}
