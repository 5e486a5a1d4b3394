//! `bright scan` command handler

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use bright_core::types::{Issue, IssuesGroup, Severity};
use bright_reporter::{CheckRunBuilder, CheckRunPayload, IssuesGrouper, StdReporter, render_table};
use bright_scan::{ExpectOptions, ExpectOutcome, ScanState, ScanStatus};

use crate::cli::{CheckRunArgs, OutputFormat, ScanAction, ScanArgs, WaitArgs};
use crate::commands::context::{Context, Scans};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `scan` command.
pub async fn execute(
    args: ScanArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let context = Context::load(config_path).await?;
    let scans = &context.scans;

    match args.action {
        ScanAction::Issues { id } => execute_issues(scans, &id, writer).await,
        ScanAction::Status { id } => execute_status(scans, &id, writer).await,
        ScanAction::Stop { id } => execute_stop(scans, &id, writer).await,
        ScanAction::Wait(wait) => execute_wait(scans, wait, writer).await,
        ScanAction::CheckRun(check) => execute_check_run(scans, check, writer).await,
    }
}

async fn execute_issues(scans: &Scans, id: &str, writer: &OutputWriter) -> Result<(), CliError> {
    let issues = scans.scan(id)?.issues().await?;
    info!(scan_id = id, count = issues.len(), "issues fetched");

    match writer.format() {
        // severity summaries go to stderr, the table to stdout
        OutputFormat::Text if !issues.is_empty() => {
            StdReporter::default().report_issues(&issues)?;
            Ok(())
        }
        _ => writer.render(&IssuesReport::new(id, issues)),
    }
}

async fn execute_status(scans: &Scans, id: &str, writer: &OutputWriter) -> Result<(), CliError> {
    let state = scans.scan(id)?.status().await?;
    writer.render(&StatusReport::new(id, &state))
}

async fn execute_stop(scans: &Scans, id: &str, writer: &OutputWriter) -> Result<(), CliError> {
    scans.scan(id)?.stop().await?;
    writer.render(&StopReport {
        scan_id: id.to_owned(),
        stop_requested: true,
    })
}

async fn execute_wait(scans: &Scans, args: WaitArgs, writer: &OutputWriter) -> Result<(), CliError> {
    if args.interval == 0 {
        return Err(CliError::Command("--interval must be at least 1 second".to_owned()));
    }

    let scan = scans.scan(args.id.as_str())?;
    let cancel = CancellationToken::new();
    let mut options = ExpectOptions::default()
        .with_interval(Duration::from_secs(args.interval))
        .with_cancel(cancel.clone());
    if args.timeout > 0 {
        options = options.with_timeout(Duration::from_secs(args.timeout));
    }

    let on_signal = cancel.clone();
    let signal = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling wait");
            on_signal.cancel();
        }
    });

    let result = scan.expect(args.severity, options).await;
    signal.abort();
    let outcome = result?;

    let report = WaitReport::new(&args.id, args.severity, &outcome);
    writer.render(&report)?;

    match outcome {
        ExpectOutcome::ThresholdReached(state) => Err(CliError::Threshold(format!(
            "{} issue(s) at or above {} severity in scan {}",
            state.count_at_or_above(args.severity),
            args.severity,
            args.id
        ))),
        ExpectOutcome::Cancelled => Err(CliError::Command("wait cancelled".to_owned())),
        ExpectOutcome::Finished(_) | ExpectOutcome::TimedOut => Ok(()),
    }
}

async fn execute_check_run(
    scans: &Scans,
    args: CheckRunArgs,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let issues = scans.scan(args.id.as_str())?.issues().await?;
    let payload = CheckRunBuilder::new()
        .name(args.name)
        .head_sha(args.sha)
        .fail_on(args.fail_on)
        .build(&issues)?;
    info!(
        scan_id = %args.id,
        conclusion = ?payload.conclusion,
        annotations = payload.output.annotations.len(),
        "check run payload built"
    );
    writer.render(&CheckRunReport(payload))
}

// ---- reports ----

/// Grouped issues of one scan.
#[derive(Serialize)]
pub struct IssuesReport {
    pub scan_id: String,
    pub total: usize,
    pub groups: Vec<IssuesGroup>,
}

impl IssuesReport {
    pub fn new(scan_id: &str, issues: Vec<Issue>) -> Self {
        Self {
            scan_id: scan_id.to_owned(),
            total: issues.len(),
            groups: IssuesGrouper::group(issues),
        }
    }
}

impl Render for IssuesReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if self.groups.is_empty() {
            writeln!(w, "{}", format!("No issues found in scan {}.", self.scan_id).green())?;
            return Ok(());
        }
        writeln!(w, "{}", render_table(&self.groups))
    }
}

/// Status of one scan with per-severity counters.
#[derive(Serialize)]
pub struct StatusReport {
    pub scan_id: String,
    pub status: ScanStatus,
    pub terminal: bool,
    pub issues: SeverityCounts,
}

#[derive(Serialize, Default)]
pub struct SeverityCounts {
    pub critical: u64,
    pub high: u64,
    pub medium: u64,
    pub low: u64,
    pub total: u64,
}

impl SeverityCounts {
    fn from_state(state: &ScanState) -> Self {
        Self {
            critical: state.count(Severity::Critical),
            high: state.count(Severity::High),
            medium: state.count(Severity::Medium),
            low: state.count(Severity::Low),
            total: state.total(),
        }
    }
}

impl StatusReport {
    pub fn new(scan_id: &str, state: &ScanState) -> Self {
        Self {
            scan_id: scan_id.to_owned(),
            status: state.status,
            terminal: state.status.is_terminal(),
            issues: SeverityCounts::from_state(state),
        }
    }
}

impl Render for StatusReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Scan: {}", self.scan_id.bold())?;
        let status = self.status.as_str();
        let status = match self.status {
            ScanStatus::Done => status.green(),
            ScanStatus::Failed | ScanStatus::Disrupted => status.red(),
            ScanStatus::Stopped => status.yellow(),
            _ => status.normal(),
        };
        writeln!(w, "Status: {status}")?;
        writeln!(w)?;

        let counts = format!(
            "{} total (C:{} H:{} M:{} L:{})",
            self.issues.total,
            self.issues.critical,
            self.issues.high,
            self.issues.medium,
            self.issues.low
        );
        if self.issues.critical > 0 || self.issues.high > 0 {
            writeln!(w, "Issues: {}", counts.red().bold())?;
        } else if self.issues.total > 0 {
            writeln!(w, "Issues: {}", counts.yellow())?;
        } else {
            writeln!(w, "Issues: {}", counts.green())?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
pub struct StopReport {
    pub scan_id: String,
    pub stop_requested: bool,
}

impl Render for StopReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "Stop requested for scan {}", self.scan_id)
    }
}

/// Result of `scan wait`.
#[derive(Serialize)]
pub struct WaitReport {
    pub scan_id: String,
    pub threshold: Severity,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ScanStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues_at_or_above: Option<u64>,
}

impl WaitReport {
    pub fn new(scan_id: &str, threshold: Severity, outcome: &ExpectOutcome) -> Self {
        let (label, state) = match outcome {
            ExpectOutcome::ThresholdReached(state) => ("threshold_reached", Some(state)),
            ExpectOutcome::Finished(state) => ("finished", Some(state)),
            ExpectOutcome::TimedOut => ("timed_out", None),
            ExpectOutcome::Cancelled => ("cancelled", None),
        };
        Self {
            scan_id: scan_id.to_owned(),
            threshold,
            outcome: label,
            status: state.map(|s| s.status),
            issues_at_or_above: state.map(|s| s.count_at_or_above(threshold)),
        }
    }
}

impl Render for WaitReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let found = self.issues_at_or_above.unwrap_or(0);
        let line = match self.outcome {
            "threshold_reached" => format!(
                "Scan {}: found {found} issue(s) at or above {} severity",
                self.scan_id, self.threshold
            )
            .red()
            .bold(),
            "finished" => format!(
                "Scan {} finished ({}) without issues at or above {} severity",
                self.scan_id,
                self.status.map(ScanStatus::as_str).unwrap_or("unknown"),
                self.threshold
            )
            .green(),
            "timed_out" => format!("Scan {}: gave up waiting", self.scan_id).yellow(),
            _ => format!("Scan {}: wait cancelled", self.scan_id).yellow(),
        };
        writeln!(w, "{line}")
    }
}

/// Check-run payload; rendered as JSON in both output formats.
#[derive(Serialize)]
#[serde(transparent)]
pub struct CheckRunReport(pub CheckRunPayload);

impl Render for CheckRunReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        serde_json::to_writer_pretty(&mut *w, &self.0).map_err(std::io::Error::other)?;
        writeln!(w)
    }
}
