//! StdReporter 통합 테스트
//!
//! 기록용 콘솔로 출력 스트림과 순서를 검증합니다.

use std::io;
use std::sync::Mutex;

use bright_core::types::{Issue, Severity};
use bright_reporter::{Console, StdReporter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Log,
    Warn,
    Error,
}

#[derive(Default)]
struct RecordingConsole {
    lines: Mutex<Vec<(Level, String)>>,
}

impl RecordingConsole {
    fn take(&self) -> Vec<(Level, String)> {
        std::mem::take(&mut *self.lines.lock().unwrap())
    }

    fn push(&self, level: Level, text: &str) -> io::Result<()> {
        self.lines.lock().unwrap().push((level, text.to_owned()));
        Ok(())
    }
}

impl Console for RecordingConsole {
    fn log(&self, text: &str) -> io::Result<()> {
        self.push(Level::Log, text)
    }

    fn warn(&self, text: &str) -> io::Result<()> {
        self.push(Level::Warn, text)
    }

    fn error(&self, text: &str) -> io::Result<()> {
        self.push(Level::Error, text)
    }
}

fn plain() {
    colored::control::set_override(false);
}

fn issue(id: &str, severity: Severity, name: &str) -> Issue {
    Issue::new(id, severity, name, format!("https://target/{id}"))
}

#[tokio::test]
async fn empty_scan_prints_nothing() {
    let reporter = StdReporter::new(RecordingConsole::default());
    reporter.report(&Vec::<Issue>::new()).await.unwrap();
    assert!(reporter.console().take().is_empty());
}

#[tokio::test]
async fn summaries_are_routed_by_severity_then_one_table() {
    plain();
    let reporter = StdReporter::new(RecordingConsole::default());
    let issues = vec![
        issue("1", Severity::Low, "Header"),
        issue("2", Severity::Critical, "RCE"),
        issue("3", Severity::Medium, "XSS"),
        issue("4", Severity::High, "SQLi"),
        issue("5", Severity::High, "SQLi"),
    ];

    reporter.report(&issues).await.unwrap();
    let lines = reporter.console().take();

    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], (Level::Error, "Found 1 Critical severity issue".to_owned()));
    assert_eq!(lines[1], (Level::Error, "Found 2 High severity issues".to_owned()));
    assert_eq!(lines[2], (Level::Warn, "Found 1 Medium severity issue".to_owned()));
    assert_eq!(lines[3], (Level::Log, "Found 1 Low severity issue".to_owned()));

    let (level, table) = &lines[4];
    assert_eq!(*level, Level::Log);
    assert!(table.starts_with("Severity"));
    let rows: Vec<&str> = table
        .lines()
        .skip(2)
        .filter(|l| !l.starts_with(' '))
        .collect();
    assert_eq!(rows.len(), 4);
    assert!(rows[0].starts_with("Critical"));
    assert!(rows[1].starts_with("High"));
    assert!(rows[1].contains("SQLi"));
    assert!(rows[2].starts_with("Medium"));
    assert!(rows[3].starts_with("Low"));
}

#[tokio::test]
async fn missing_severities_are_skipped() {
    plain();
    let reporter = StdReporter::new(RecordingConsole::default());
    reporter
        .report(&vec![issue("1", Severity::Medium, "XSS")])
        .await
        .unwrap();
    let lines = reporter.console().take();

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].0, Level::Warn);
    assert!(lines[1].1.contains("1. https://target/1"));
}

#[tokio::test]
async fn table_is_printed_exactly_once() {
    plain();
    let reporter = StdReporter::new(RecordingConsole::default());
    let issues: Vec<Issue> = (0..10)
        .map(|i| issue(&i.to_string(), Severity::Low, "Header"))
        .collect();
    reporter.report(&issues).await.unwrap();

    let tables = reporter
        .console()
        .take()
        .into_iter()
        .filter(|(_, text)| text.starts_with("Severity"))
        .count();
    assert_eq!(tables, 1);
}
