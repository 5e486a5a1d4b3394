//! 콘솔 리포터
//!
//! 이슈가 하나라도 있으면 심각도별 요약 줄을 심각도에 맞는 스트림으로 보내고
//! (Critical/High → error, Medium → warn, Low → log), 이어서 그룹 표를
//! 정확히 한 번 출력합니다. 이슈가 없으면 아무것도 출력하지 않습니다.
//!
//! 심각도 집합에 Critical이 포함되어 있으므로 Critical 요약 줄도 High와 함께
//! error 스트림으로 나갑니다.

use std::fmt::Write as _;

use colored::Colorize;
use tracing::debug;

use bright_core::dispatcher::IssueSource;
use bright_core::error::BrightError;
use bright_core::metrics as m;
use bright_core::types::{Issue, IssuesGroup, Severity};

use crate::console::{Console, StdConsole};
use crate::grouper::IssuesGrouper;

const HEADERS: [&str; 4] = ["Severity", "Finding", "Count", "Targets"];

/// 콘솔 리포터
pub struct StdReporter<C = StdConsole> {
    console: C,
}

impl Default for StdReporter<StdConsole> {
    fn default() -> Self {
        Self::new(StdConsole)
    }
}

impl<C: Console> StdReporter<C> {
    pub fn new(console: C) -> Self {
        Self { console }
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    /// 이슈 공급원에서 이슈를 가져와 출력합니다.
    pub async fn report<S: IssueSource>(&self, source: &S) -> Result<(), BrightError> {
        let issues = source.issues().await?;
        self.report_issues(&issues)
    }

    /// 이미 가져온 이슈를 출력합니다.
    pub fn report_issues(&self, issues: &[Issue]) -> Result<(), BrightError> {
        if issues.is_empty() {
            debug!("no issues to report");
            return Ok(());
        }

        for severity in Severity::DESCENDING {
            let count = issues.iter().filter(|i| i.severity == severity).count();
            if count == 0 {
                continue;
            }
            metrics::counter!(
                m::REPORTER_ISSUES_REPORTED_TOTAL,
                m::LABEL_SEVERITY => severity.as_label()
            )
            .increment(u64::try_from(count).unwrap_or(u64::MAX));

            let line = summary_line(severity, count);
            match severity {
                Severity::Critical | Severity::High => self.console.error(&line)?,
                Severity::Medium => self.console.warn(&line)?,
                Severity::Low => self.console.log(&line)?,
            }
        }

        let groups = IssuesGrouper::group(issues.iter().cloned());
        self.console.log(&render_table(&groups))?;
        Ok(())
    }
}

fn summary_line(severity: Severity, count: usize) -> String {
    let noun = if count == 1 { "issue" } else { "issues" };
    let text = format!("Found {count} {severity} severity {noun}");
    match severity {
        Severity::Critical => text.red().bold().to_string(),
        Severity::High => text.red().to_string(),
        Severity::Medium => text.yellow().to_string(),
        Severity::Low => text.blue().to_string(),
    }
}

/// 그룹 목록을 고정폭 표로 렌더링합니다.
///
/// 대상 URL은 그룹 안에서 `1.`, `2.` 번호를 붙여 한 줄씩 나열합니다.
pub fn render_table(groups: &[IssuesGroup]) -> String {
    let rows: Vec<[String; 3]> = groups
        .iter()
        .map(|g| {
            [
                g.severity.to_string(),
                g.name.clone(),
                g.issues.len().to_string(),
            ]
        })
        .collect();

    let mut widths = [HEADERS[0].len(), HEADERS[1].len(), HEADERS[2].len()];
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    let indent = widths.iter().sum::<usize>() + 2 * widths.len();

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<w0$}  {:<w1$}  {:<w2$}  {}",
        HEADERS[0],
        HEADERS[1],
        HEADERS[2],
        HEADERS[3],
        w0 = widths[0],
        w1 = widths[1],
        w2 = widths[2],
    );
    let _ = writeln!(out, "{}", "-".repeat(indent + HEADERS[3].len().max(40)));

    for (group, row) in groups.iter().zip(&rows) {
        for (i, issue) in group.issues.iter().enumerate() {
            let target = format!("{}. {}", i + 1, issue.request.url);
            if i == 0 {
                let _ = writeln!(
                    out,
                    "{:<w0$}  {:<w1$}  {:<w2$}  {}",
                    row[0],
                    row[1],
                    row[2],
                    target,
                    w0 = widths[0],
                    w1 = widths[1],
                    w2 = widths[2],
                );
            } else {
                let _ = writeln!(out, "{:indent$}{}", "", target);
            }
        }
    }

    out.trim_end().to_owned()
}
