mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use mindful_horizon::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
