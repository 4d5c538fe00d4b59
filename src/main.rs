//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `shared_ip_heatmap` library that handles:
//! - Environment variable loading (.env file)
//! - Command-line argument parsing
//! - Logger initialization
//! - Shutdown signal wiring
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;
use tokio_util::sync::CancellationToken;

use shared_ip_heatmap::initialization::init_logger_with;
use shared_ip_heatmap::{cancel_on_shutdown_signal, run_pipeline, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional; real environment variables take precedence
    let _ = dotenvy::dotenv();

    let config = Config::parse();

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_shutdown_signal(cancel.clone()));

    if let Err(e) = run_pipeline(config, cancel).await {
        log::error!("shared_ip_heatmap error: {:#}", e);
        eprintln!("shared_ip_heatmap error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}
