mod cli;
mod console;
mod infra;
mod routes;
mod server;

use strategy_agent::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
