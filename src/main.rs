//! PaperHub: folders with a fixed sheet capacity and the documents filed in them.
//!
//! Command-line entry point that wires configuration, logging, storage, and
//! services together.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use paperhub_core::config::AppConfig;
use paperhub_core::error::AppError;

mod commands;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_configuration(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = cli.execute(&config).await {
        tracing::error!(kind = %e.kind(), "Command failed: {}", e);
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}

/// Load configuration from file, environment overlay, and `PAPERHUB__*` variables.
fn load_configuration(config_path: &str) -> Result<AppConfig, AppError> {
    let env = std::env::var("PAPERHUB_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(config_path, &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
