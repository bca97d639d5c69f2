#![cfg(not(tarpaulin_include))]

use clap::Parser;
use datable::{app, config::Config};

/// Main entry point for the web application
///
/// Reads the configuration from the command line and environment, sets up
/// logging and serves the grid until the process is stopped.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    let default_level = if config.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    app::run(config).await?;

    Ok(())
}
