//! Main entry point for the ipservice CLI

use anyhow::Context;
use clap::Parser;
use log::info;

use ipservice::cli::Cli;
use ipservice::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    info!("Starting ipservice v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    cli.run(config).await.context("ipservice failed")?;

    Ok(())
}
