//! Bright CLI library: argument model, command handlers and output rendering.
//!
//! The `bright` binary in `main.rs` is a thin shell around [`run`].

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;

use cli::{Cli, Commands};
use error::CliError;
use output::OutputWriter;

/// Dispatch a parsed command line to its handler.
pub async fn run(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);
    match cli.command {
        Commands::Scan(args) => commands::scan::execute(args, &cli.config, &writer).await,
        Commands::Config(args) => commands::config::execute(args, &cli.config, &writer).await,
    }
}
