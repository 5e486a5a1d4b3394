//! GitHub check-run 페이로드 생성
//!
//! Checks API에 그대로 보낼 수 있는 JSON(snake_case) 구조를 만듭니다.
//! 전송은 이 크레이트의 범위 밖입니다.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use bright_core::types::{Issue, Severity, severity_comparator, severity_to_number};

use crate::error::ReportError;
use crate::grouper::IssuesGrouper;

/// Checks API가 한 번에 받는 최대 annotation 수
pub const MAX_ANNOTATIONS: usize = 50;

/// 기본 check-run 이름
pub const DEFAULT_CHECK_NAME: &str = "Bright DAST";

/// check-run 결론
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conclusion {
    Success,
    Failure,
    Neutral,
}

/// annotation 레벨
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationLevel {
    Failure,
    Warning,
    Notice,
}

impl From<Severity> for AnnotationLevel {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Critical | Severity::High => Self::Failure,
            Severity::Medium => Self::Warning,
            Severity::Low => Self::Notice,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub path: String,
    pub start_line: u32,
    pub end_line: u32,
    pub annotation_level: AnnotationLevel,
    pub message: String,
    pub raw_details: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRunOutput {
    pub title: String,
    pub summary: String,
    pub text: String,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRunPayload {
    pub name: String,
    pub head_sha: String,
    pub conclusion: Conclusion,
    pub output: CheckRunOutput,
}

/// check-run 페이로드 빌더
///
/// # 사용 예시
/// ```ignore
/// let payload = CheckRunBuilder::new()
///     .head_sha(sha)
///     .fail_on(Severity::Medium)
///     .build(&issues)?;
/// println!("{}", serde_json::to_string_pretty(&payload)?);
/// ```
#[derive(Debug, Clone)]
pub struct CheckRunBuilder {
    name: String,
    head_sha: Option<String>,
    fail_on: Severity,
    annotation_path: String,
}

impl Default for CheckRunBuilder {
    fn default() -> Self {
        Self {
            name: DEFAULT_CHECK_NAME.to_owned(),
            head_sha: None,
            fail_on: Severity::High,
            annotation_path: ".".to_owned(),
        }
    }
}

impl CheckRunBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// 대상 커밋 SHA (필수)
    pub fn head_sha(mut self, sha: impl Into<String>) -> Self {
        self.head_sha = Some(sha.into());
        self
    }

    /// 이 심각도 이상의 이슈가 있으면 `failure`로 결론냅니다.
    pub fn fail_on(mut self, severity: Severity) -> Self {
        self.fail_on = severity;
        self
    }

    /// annotation이 가리킬 저장소 경로
    pub fn annotation_path(mut self, path: impl Into<String>) -> Self {
        self.annotation_path = path.into();
        self
    }

    pub fn build(&self, issues: &[Issue]) -> Result<CheckRunPayload, ReportError> {
        let head_sha = self
            .head_sha
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ReportError::MissingField("head_sha".to_owned()))?;
        if self.name.trim().is_empty() {
            return Err(ReportError::InvalidValue {
                field: "name".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        let mut ordered: Vec<&Issue> = issues.iter().collect();
        ordered.sort_by(|a, b| severity_comparator(&a.severity, &b.severity));

        let annotations = ordered
            .iter()
            .take(MAX_ANNOTATIONS)
            .map(|issue| self.annotation(issue))
            .collect();

        Ok(CheckRunPayload {
            name: self.name.clone(),
            head_sha: head_sha.to_owned(),
            conclusion: self.conclusion(issues),
            output: CheckRunOutput {
                title: title(issues.len()),
                summary: summary(issues),
                text: details(issues),
                annotations,
            },
        })
    }

    fn conclusion(&self, issues: &[Issue]) -> Conclusion {
        let floor = severity_to_number(self.fail_on);
        if issues.is_empty() {
            Conclusion::Success
        } else if issues
            .iter()
            .any(|i| severity_to_number(i.severity) >= floor)
        {
            Conclusion::Failure
        } else {
            Conclusion::Neutral
        }
    }

    fn annotation(&self, issue: &Issue) -> Annotation {
        let method = issue.request.method.as_deref().unwrap_or("GET");
        let raw_details = if issue.details.trim().is_empty() {
            issue.remedy.trim().to_owned()
        } else {
            issue.details.trim().to_owned()
        };
        Annotation {
            path: self.annotation_path.clone(),
            start_line: 1,
            end_line: 1,
            annotation_level: issue.severity.into(),
            message: format!(
                "[{}] {} at {} {}",
                issue.severity, issue.name, method, issue.request.url
            ),
            raw_details,
        }
    }
}

fn title(total: usize) -> String {
    match total {
        0 => "No issues found".to_owned(),
        1 => "1 issue found".to_owned(),
        n => format!("{n} issues found"),
    }
}

fn summary(issues: &[Issue]) -> String {
    let counts: Vec<String> = Severity::DESCENDING
        .iter()
        .map(|&s| {
            let n = issues.iter().filter(|i| i.severity == s).count();
            format!("{s}: {n}")
        })
        .collect();
    let noun = if issues.len() == 1 { "issue" } else { "issues" };
    let mut out = format!("Found {} {noun} ({}).", issues.len(), counts.join(", "));
    if issues.len() > MAX_ANNOTATIONS {
        let _ = write!(
            out,
            " Showing the first {MAX_ANNOTATIONS} annotations; {} more not annotated.",
            issues.len() - MAX_ANNOTATIONS
        );
    }
    out
}

fn details(issues: &[Issue]) -> String {
    if issues.is_empty() {
        return String::new();
    }
    let mut out = String::from("| Severity | Finding | Count |\n| --- | --- | --- |\n");
    for group in IssuesGrouper::group(issues.iter().cloned()) {
        let _ = writeln!(
            out,
            "| {} | {} | {} |",
            group.severity,
            group.name.replace('|', "\\|"),
            group.issues.len()
        );
    }
    out
}
