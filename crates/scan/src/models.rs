//! 스캔 API 데이터 모델
//!
//! JSON 필드명은 REST API를 따라 camelCase입니다.

use std::fmt;
use std::path::Path;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use bright_core::types::{Severity, severity_to_number};

use crate::error::ScanError;

/// HAR 파일 MIME 타입
pub const HAR_CONTENT_TYPE: &str = "application/har+json";

/// 스캔 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Pending,
    Running,
    Done,
    Failed,
    Stopped,
    Disrupted,
    Scheduled,
    Queued,
}

impl ScanStatus {
    /// 더 이상 진행되지 않는 상태인지 확인합니다.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Done | Self::Failed | Self::Stopped | Self::Disrupted
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Done => "done",
            Self::Failed => "failed",
            Self::Stopped => "stopped",
            Self::Disrupted => "disrupted",
            Self::Scheduled => "scheduled",
            Self::Queued => "queued",
        }
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 심각도별 이슈 수
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCount {
    #[serde(rename = "type")]
    pub severity: Severity,
    pub number: u64,
}

/// 스캔 상태 조회 응답
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanState {
    pub status: ScanStatus,
    #[serde(default)]
    pub issues_by_severity: Vec<SeverityCount>,
}

impl ScanState {
    /// 특정 심각도의 이슈 수
    pub fn count(&self, severity: Severity) -> u64 {
        self.issues_by_severity
            .iter()
            .filter(|c| c.severity == severity)
            .fold(0u64, |acc, c| acc.saturating_add(c.number))
    }

    /// 임계값 이상 심각도의 이슈 수
    pub fn count_at_or_above(&self, threshold: Severity) -> u64 {
        let floor = severity_to_number(threshold);
        self.issues_by_severity
            .iter()
            .filter(|c| severity_to_number(c.severity) >= floor)
            .fold(0u64, |acc, c| acc.saturating_add(c.number))
    }

    /// 전체 이슈 수
    pub fn total(&self) -> u64 {
        self.issues_by_severity
            .iter()
            .fold(0u64, |acc, c| acc.saturating_add(c.number))
    }
}

/// 생성 요청의 응답 (`{id}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Created {
    pub id: String,
}

/// 엔트리 포인트 발견 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Discovery {
    /// 크롤러가 대상 URL에서 출발
    Crawler,
    /// 업로드한 HAR 파일에서 요청 추출
    Archive,
    /// OpenAPI 명세
    Oas,
}

/// 스캔 생성 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub module: String,
    pub tests: Vec<String>,
    pub discovery_types: Vec<Discovery>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crawler_urls: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeaters: Option<Vec<String>>,
    pub smart: bool,
}

impl ScanConfig {
    /// 기본값(`module = "dast"`, smart 모드)으로 설정을 시작합니다.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            project_id: None,
            module: "dast".to_owned(),
            tests: Vec::new(),
            discovery_types: Vec::new(),
            crawler_urls: None,
            file_id: None,
            repeaters: None,
            smart: true,
        }
    }

    pub fn with_tests<I, S>(mut self, tests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tests = tests.into_iter().map(Into::into).collect();
        self
    }

    /// 크롤러 발견 방식을 추가합니다.
    pub fn with_crawler<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push_discovery(Discovery::Crawler);
        self.crawler_urls = Some(urls.into_iter().map(Into::into).collect());
        self
    }

    /// HAR 파일 발견 방식을 추가합니다.
    pub fn with_archive(mut self, file_id: impl Into<String>) -> Self {
        self.push_discovery(Discovery::Archive);
        self.file_id = Some(file_id.into());
        self
    }

    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_repeater(mut self, repeater_id: impl Into<String>) -> Self {
        self.repeaters
            .get_or_insert_with(Vec::new)
            .push(repeater_id.into());
        self
    }

    fn push_discovery(&mut self, discovery: Discovery) {
        if !self.discovery_types.contains(&discovery) {
            self.discovery_types.push(discovery);
        }
    }

    /// 전송 전에 설정을 검증합니다.
    pub fn validate(&self) -> Result<(), ScanError> {
        let invalid = |field: &str, reason: &str| ScanError::InvalidConfig {
            field: field.to_owned(),
            reason: reason.to_owned(),
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name", "must not be empty"));
        }
        if self.tests.is_empty() {
            return Err(invalid("tests", "at least one test is required"));
        }
        if self.discovery_types.is_empty() {
            return Err(invalid("discovery_types", "at least one discovery type is required"));
        }
        if self.discovery_types.contains(&Discovery::Crawler)
            && self.crawler_urls.as_ref().is_none_or(Vec::is_empty)
        {
            return Err(invalid("crawler_urls", "required for crawler discovery"));
        }
        if self.discovery_types.contains(&Discovery::Archive)
            && self.file_id.as_deref().is_none_or(str::is_empty)
        {
            return Err(invalid("file_id", "required for archive discovery"));
        }
        Ok(())
    }
}

/// 업로드할 HAR 파일
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarFile {
    pub file_name: String,
    pub content: Bytes,
    /// 스캔이 끝나면 서버에서 삭제할지 여부
    pub discard: bool,
}

impl HarFile {
    pub fn new(file_name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
            discard: true,
        }
    }

    /// 디스크에서 HAR 파일을 읽습니다.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "archive.har".to_owned());
        Ok(Self::new(file_name, content))
    }

    pub fn with_discard(mut self, discard: bool) -> Self {
        self.discard = discard;
        self
    }
}
