//! Index janitor CLI
//!
//! Drops every secondary index from the storefront collections so the
//! application can rebuild them from its schema on next startup.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use anyhow::{Context, Result};
use clap::Parser;
use index_janitor::{execute, exit_status, EXIT_FAILURE};
use index_janitor_core::Config;
use index_janitor_storage::connect_index_admin;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, warn};

#[derive(Parser, Debug)]
#[command(name = "index-janitor")]
#[command(about = "Drop secondary indexes from a fixed set of MongoDB collections")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Collection to clean; repeat to replace the configured list
    #[arg(long = "collection", value_name = "NAME")]
    collections: Vec<String>,

    /// Report what would be dropped without dropping anything
    #[arg(long)]
    dry_run: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Command-line flags take precedence over file and environment
    fn apply_overrides(&self, config: &mut Config) {
        if !self.collections.is_empty() {
            config.janitor.collections = self.collections.clone();
        }
        if self.dry_run {
            config.janitor.dry_run = true;
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("{e:#}");
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    let result = execute(
        &config,
        |mongo| async move { connect_index_admin(&mongo).await },
        shutdown_signal(),
    )
    .await;

    ExitCode::from(exit_status(&result))
}

/// Initialize logging system
///
/// `RUST_LOG` wins when set; otherwise `--verbose` selects debug output.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(format!(
                    "index_janitor={level},index_janitor_storage={level},warn"
                ))
            }),
        )
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config =
        Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    cli.apply_overrides(&mut config);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}
