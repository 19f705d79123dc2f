mod cli;
mod infra;
mod lookup;
mod routes;
mod server;

use std::process::ExitCode;
use tenderforce::error::AppError;

pub async fn run() -> Result<ExitCode, AppError> {
    cli::run().await
}
