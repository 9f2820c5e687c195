mod cli;
mod commands;
mod infra;
mod routes;
mod scheduler;
mod server;

use property_register::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
