//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand, ValueEnum};

use bright_core::types::Severity;
use bright_reporter::DEFAULT_CHECK_NAME;

/// Bright -- command-line client for the Bright DAST platform.
///
/// Use `bright <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "bright", version, about, long_about = None)]
pub struct Cli {
    /// Path to the bright.toml configuration file.
    #[arg(short, long, default_value = "bright.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect and control scans.
    Scan(ScanArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- scan ----

/// Inspect and control scans on the Bright platform.
#[derive(Args, Debug)]
pub struct ScanArgs {
    #[command(subcommand)]
    pub action: ScanAction,
}

#[derive(Subcommand, Debug)]
pub enum ScanAction {
    /// Print the issues found by a scan, grouped by severity and name.
    Issues {
        /// Scan ID.
        id: String,
    },
    /// Show the scan status and per-severity issue counters.
    Status {
        /// Scan ID.
        id: String,
    },
    /// Stop a running scan.
    Stop {
        /// Scan ID.
        id: String,
    },
    /// Poll a scan until issues at or above a severity appear.
    ///
    /// Exits with code 4 when the threshold is reached.
    Wait(WaitArgs),
    /// Build a GitHub check-run payload from the scan's issues.
    CheckRun(CheckRunArgs),
}

#[derive(Args, Debug)]
pub struct WaitArgs {
    /// Scan ID.
    pub id: String,

    /// Severity threshold (low, medium, high, critical).
    #[arg(long, default_value = "high", value_parser = parse_severity)]
    pub severity: Severity,

    /// Give up after this many seconds (0 = wait until the scan finishes).
    #[arg(long, default_value_t = 600)]
    pub timeout: u64,

    /// Seconds between status polls.
    #[arg(long, default_value_t = 5)]
    pub interval: u64,
}

#[derive(Args, Debug)]
pub struct CheckRunArgs {
    /// Scan ID.
    pub id: String,

    /// Commit SHA the check run is attached to.
    #[arg(long)]
    pub sha: String,

    /// Check run name.
    #[arg(long, default_value = DEFAULT_CHECK_NAME)]
    pub name: String,

    /// Conclude with `failure` when an issue at or above this severity exists.
    #[arg(long, default_value = "high", value_parser = parse_severity)]
    pub fail_on: Severity,
}

fn parse_severity(s: &str) -> Result<Severity, String> {
    Severity::from_str(s).map_err(|_| format!("invalid severity: {s} (expected: low, medium, high, critical)"))
}

// ---- config ----

/// Manage bright configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, api, retry, bus).
        #[arg(long)]
        section: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_debug_assert() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parse_defaults() {
        let cli = Cli::try_parse_from(["bright", "config", "validate"]).expect("parse succeeded");
        assert_eq!(cli.config, PathBuf::from("bright.toml"));
        assert_eq!(cli.output, OutputFormat::Text);
        assert!(cli.log_level.is_none());
    }

    #[test]
    fn test_cli_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "bright",
            "-c",
            "/etc/bright.toml",
            "scan",
            "status",
            "abc",
            "--output",
            "json",
            "--log-level",
            "debug",
        ])
        .expect("parse succeeded");
        assert_eq!(cli.config, PathBuf::from("/etc/bright.toml"));
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Commands::Scan(ScanArgs {
                action: ScanAction::Status { id },
            }) => assert_eq!(id, "abc"),
            other => panic!("expected scan status, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_scan_issues() {
        let cli = Cli::try_parse_from(["bright", "scan", "issues", "s-1"]).expect("parse succeeded");
        match cli.command {
            Commands::Scan(ScanArgs {
                action: ScanAction::Issues { id },
            }) => assert_eq!(id, "s-1"),
            other => panic!("expected scan issues, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_scan_wait_defaults() {
        let cli = Cli::try_parse_from(["bright", "scan", "wait", "s-1"]).expect("parse succeeded");
        match cli.command {
            Commands::Scan(ScanArgs {
                action: ScanAction::Wait(args),
            }) => {
                assert_eq!(args.id, "s-1");
                assert_eq!(args.severity, Severity::High);
                assert_eq!(args.timeout, 600);
                assert_eq!(args.interval, 5);
            }
            other => panic!("expected scan wait, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_scan_wait_custom() {
        let cli = Cli::try_parse_from([
            "bright", "scan", "wait", "s-1", "--severity", "MEDIUM", "--timeout", "0", "--interval",
            "1",
        ])
        .expect("parse succeeded");
        match cli.command {
            Commands::Scan(ScanArgs {
                action: ScanAction::Wait(args),
            }) => {
                assert_eq!(args.severity, Severity::Medium);
                assert_eq!(args.timeout, 0);
                assert_eq!(args.interval, 1);
            }
            other => panic!("expected scan wait, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_scan_wait_rejects_unknown_severity() {
        let result = Cli::try_parse_from(["bright", "scan", "wait", "s-1", "--severity", "info"]);
        assert!(result.is_err(), "unknown severity should be rejected");
    }

    #[test]
    fn test_cli_parse_check_run_requires_sha() {
        let result = Cli::try_parse_from(["bright", "scan", "check-run", "s-1"]);
        assert!(result.is_err(), "--sha is required");
    }

    #[test]
    fn test_cli_parse_check_run() {
        let cli = Cli::try_parse_from([
            "bright",
            "scan",
            "check-run",
            "s-1",
            "--sha",
            "deadbeef",
            "--fail-on",
            "critical",
        ])
        .expect("parse succeeded");
        match cli.command {
            Commands::Scan(ScanArgs {
                action: ScanAction::CheckRun(args),
            }) => {
                assert_eq!(args.sha, "deadbeef");
                assert_eq!(args.name, DEFAULT_CHECK_NAME);
                assert_eq!(args.fail_on, Severity::Critical);
            }
            other => panic!("expected scan check-run, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_config_show_section() {
        let cli = Cli::try_parse_from(["bright", "config", "show", "--section", "api"])
            .expect("parse succeeded");
        match cli.command {
            Commands::Config(ConfigArgs {
                action: ConfigAction::Show { section },
            }) => assert_eq!(section.as_deref(), Some("api")),
            other => panic!("expected config show, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_invalid_output_format() {
        let result = Cli::try_parse_from(["bright", "--output", "yaml", "config", "validate"]);
        assert!(result.is_err(), "unknown output format should be rejected");
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["bright"]).is_err());
    }
}
