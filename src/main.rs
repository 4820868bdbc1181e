//! Open Broadcast Playlist - turn a discovery page into a catalog playlist.
//!
//! Two pipelines, run as separate invocations and joined by a query file:
//! - `harvest` renders the discovery page, scrolls it until no more tracks
//!   load, and writes one search query per track
//! - `build` resolves each query against the catalog and replaces (or
//!   appends to) a named playlist

pub mod builder;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod harvest;
pub mod model;
pub mod query_file;
#[cfg(test)]
pub mod test_utils;

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::LoggingConfig;

fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let args = cli::Cli::parse();
    // Logging comes up even when the config is broken, so the failure
    // lands in the run log with the usual markers.
    let loaded = config::load(args.config.as_deref());
    let logging = loaded
        .as_ref()
        .map(|config| config.logging.clone())
        .unwrap_or_default();

    init_logging(&logging, args.log_file.as_deref())?;

    cli::run_command(&args, loaded)
}

/// Log to stderr and, when configured, append to the run log file.
///
/// `RUST_LOG` takes precedence over the configured filter.
fn init_logging(logging: &LoggingConfig, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.filter))
        .with_context(|| format!("invalid log filter {:?}", logging.filter))?;

    let file_layer = match log_file.or(logging.file.as_deref()) {
        Some(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("creating log directory {}", dir.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(file_layer)
        .init();
    Ok(())
}
