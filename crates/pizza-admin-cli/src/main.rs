//! `pizza-admin` command line tool

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

use clap::Parser;
use pizza_admin_cli::{Cli, execute};
use pizza_admin_core::{Config, init_logging};
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if it exists (for development convenience)
    // A missing .env is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = match Config::load_from(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(level) = &cli.log_level {
        config.logging.level.clone_from(level);
    }
    if cli.json {
        config.logging.format = "json".to_string();
    }
    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        mock = cli.mock,
        "pizza-admin starting"
    );

    match execute(&cli, &config).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
