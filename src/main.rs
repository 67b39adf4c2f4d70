// src/main.rs
use anyhow::Result;
use clap::Parser;
use signal_query_service::cli::{execute_command, Cli};
use signal_query_service::config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Parse command line arguments
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;

    // Execute command
    execute_command(&config, cli.command).await?;

    Ok(())
}
