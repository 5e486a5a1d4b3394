//! `bright` -- command-line client for the Bright DAST platform.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use bright_cli::cli::Cli;
use bright_cli::commands::context::load_config;
use bright_cli::logging::init_tracing;
use bright_core::config::GeneralConfig;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = setup_logging(&cli).await {
        eprintln!("{} {e:#}", "warning:".yellow().bold());
    }

    match bright_cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}

/// Install the tracing subscriber from `[general]`, with `--log-level` on top.
///
/// An unreadable config file falls back to defaults here; the command itself
/// reports the real configuration error.
async fn setup_logging(cli: &Cli) -> Result<()> {
    let mut general = load_config(&cli.config)
        .await
        .map(|config| config.general)
        .unwrap_or_else(|_| GeneralConfig {
            log_level: "warn".to_owned(),
            ..GeneralConfig::default()
        });
    if let Some(level) = &cli.log_level {
        general.log_level.clone_from(level);
    }
    init_tracing(&general)
}
