//! 도메인 타입: 원격 스캔이 만들어 내는 이슈와 심각도
//!
//! 심각도는 `Low < Medium < High < Critical` 순서의 4단계를 정식 집합으로 사용합니다.
//! 스캔 서비스가 이 외의 값을 보내면 [`BrightError::UnknownSeverity`]로 실패합니다.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BrightError;

/// 심각도 레벨
///
/// `Ord` 구현으로 심각도 비교가 가능합니다 (`Low < Medium < High < Critical`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Severity {
    /// 낮은 심각도
    Low,
    /// 중간 심각도
    Medium,
    /// 높은 심각도
    High,
    /// 치명적: 즉시 대응 필요
    Critical,
}

impl Severity {
    /// 심각도가 높은 순서로 나열한 전체 집합
    pub const DESCENDING: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    /// 문자열에서 심각도를 파싱합니다.
    ///
    /// 대소문자를 구분하지 않습니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" | "med" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" | "crit" => Some(Self::Critical),
            _ => None,
        }
    }

    /// 소문자 레이블 (메트릭 태그, CLI 인자용)
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
            Self::Critical => write!(f, "Critical"),
        }
    }
}

impl FromStr for Severity {
    type Err = BrightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_loose(s).ok_or_else(|| BrightError::UnknownSeverity(s.to_owned()))
    }
}

impl TryFrom<String> for Severity {
    type Error = BrightError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// 심각도를 숫자로 변환합니다 (`Low=1`, `Medium=2`, `High=3`, `Critical=4`).
pub fn severity_to_number(severity: Severity) -> u8 {
    match severity {
        Severity::Low => 1,
        Severity::Medium => 2,
        Severity::High => 3,
        Severity::Critical => 4,
    }
}

/// 심각도 비교 함수
///
/// `Less`는 `a`가 `b`보다 심각하다는 뜻입니다. 이 비교 함수로 정렬하면
/// `Critical`이 맨 앞, `Low`가 맨 뒤에 옵니다.
pub fn severity_comparator(a: &Severity, b: &Severity) -> Ordering {
    severity_to_number(*b).cmp(&severity_to_number(*a))
}

/// 스캐너가 보낸 HTTP 요청 스냅샷
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// HTTP 메서드
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// 대상 URL
    pub url: String,
    /// 요청 헤더
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// 요청 본문
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// 이슈에 달린 설명 코멘트
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub headline: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub links: Vec<String>,
}

/// 이슈 재현 스크린샷
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Screenshot {
    pub url: String,
    pub title: String,
}

/// 원격 스캔이 보고한 취약점 하나
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// 이슈 ID
    pub id: String,
    /// 심각도
    pub severity: Severity,
    /// 취약점 이름 (예: "Reflected Cross-site scripting (XSS)")
    pub name: String,
    /// 취약점을 드러낸 요청
    pub request: Request,
    /// 변조 전 원본 요청
    pub original_request: Request,
    /// 조치 방법
    #[serde(default)]
    pub remedy: String,
    /// 상세 설명
    #[serde(default)]
    pub details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<Comment>>,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub screenshots: Vec<Screenshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cvss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwe: Option<String>,
    #[serde(default)]
    pub frames: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposure: Option<String>,
    #[serde(default)]
    pub certainty: bool,
}

impl Issue {
    /// 테스트와 예제에서 쓰는 최소 이슈를 생성합니다.
    pub fn new(
        id: impl Into<String>,
        severity: Severity,
        name: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        let request = Request {
            method: Some("GET".to_owned()),
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
        };
        Self {
            id: id.into(),
            severity,
            name: name.into(),
            original_request: request.clone(),
            request,
            remedy: String::new(),
            details: String::new(),
            comments: None,
            resources: Vec::new(),
            screenshots: Vec::new(),
            cvss: None,
            cwe: None,
            frames: Vec::new(),
            protocol: None,
            time: None,
            exposure: None,
            certainty: false,
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {} {}",
            self.severity,
            self.name,
            self.request.method.as_deref().unwrap_or("GET"),
            self.request.url,
        )
    }
}

/// 같은 `(severity, name)`을 공유하는 이슈 묶음
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuesGroup {
    pub severity: Severity,
    pub name: String,
    pub issues: Vec<Issue>,
}

impl IssuesGroup {
    /// 이슈 하나로 새 그룹을 시작합니다.
    pub fn new(issue: Issue) -> Self {
        Self {
            severity: issue.severity,
            name: issue.name.clone(),
            issues: vec![issue],
        }
    }

    /// 이 그룹에 속하는 이슈인지 확인합니다.
    pub fn accepts(&self, issue: &Issue) -> bool {
        self.severity == issue.severity && self.name == issue.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn severity_to_number_is_one_based() {
        assert_eq!(severity_to_number(Severity::Low), 1);
        assert_eq!(severity_to_number(Severity::Medium), 2);
        assert_eq!(severity_to_number(Severity::High), 3);
        assert_eq!(severity_to_number(Severity::Critical), 4);
    }

    #[test]
    fn comparator_puts_more_severe_first() {
        assert_eq!(
            severity_comparator(&Severity::Critical, &Severity::Low),
            Ordering::Less
        );
        assert_eq!(
            severity_comparator(&Severity::Low, &Severity::High),
            Ordering::Greater
        );
        assert_eq!(
            severity_comparator(&Severity::Medium, &Severity::Medium),
            Ordering::Equal
        );
    }

    #[test]
    fn comparator_is_total_and_antisymmetric() {
        for a in Severity::DESCENDING {
            for b in Severity::DESCENDING {
                assert_eq!(severity_comparator(&a, &b), severity_comparator(&b, &a).reverse());
            }
        }
    }

    #[test]
    fn sorting_by_comparator_is_stable() {
        let mut issues = vec![
            Issue::new("1", Severity::Low, "a", "https://x/1"),
            Issue::new("2", Severity::High, "b", "https://x/2"),
            Issue::new("3", Severity::Low, "c", "https://x/3"),
            Issue::new("4", Severity::Critical, "d", "https://x/4"),
            Issue::new("5", Severity::High, "e", "https://x/5"),
        ];
        issues.sort_by(|a, b| severity_comparator(&a.severity, &b.severity));
        let ids: Vec<&str> = issues.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["4", "2", "5", "1", "3"]);
    }

    #[test]
    fn severity_display_and_label() {
        assert_eq!(Severity::Critical.to_string(), "Critical");
        assert_eq!(Severity::Medium.as_label(), "medium");
    }

    #[test]
    fn severity_from_str_rejects_unknown() {
        assert_eq!("HIGH".parse::<Severity>().unwrap(), Severity::High);
        let err = "Informational".parse::<Severity>().unwrap_err();
        assert!(matches!(err, BrightError::UnknownSeverity(ref s) if s == "Informational"));
    }

    #[test]
    fn severity_serde_uses_capitalized_names() {
        assert_eq!(serde_json::to_string(&Severity::High).unwrap(), "\"High\"");
        let parsed: Severity = serde_json::from_str("\"Critical\"").unwrap();
        assert_eq!(parsed, Severity::Critical);
        assert!(serde_json::from_str::<Severity>("\"Bogus\"").is_err());
    }

    #[test]
    fn issue_deserializes_from_api_shape() {
        let json = r#"{
            "id": "abc",
            "severity": "Medium",
            "name": "Missing header",
            "remedy": "Add it",
            "details": "Details",
            "request": {"method": "GET", "url": "https://example.com/", "headers": {"accept": "*/*"}},
            "originalRequest": {"method": "GET", "url": "https://example.com/", "headers": {}},
            "cwe": "CWE-693",
            "certainty": true
        }"#;
        let issue: Issue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.severity, Severity::Medium);
        assert_eq!(issue.request.headers.get("accept").map(String::as_str), Some("*/*"));
        assert_eq!(issue.cwe.as_deref(), Some("CWE-693"));
        assert!(issue.certainty);
        assert!(issue.screenshots.is_empty());
    }

    #[test]
    fn issue_display() {
        let issue = Issue::new("1", Severity::High, "SQL Injection", "https://example.com/q");
        let display = issue.to_string();
        assert!(display.contains("High"));
        assert!(display.contains("SQL Injection"));
        assert!(display.contains("https://example.com/q"));
    }

    #[test]
    fn group_accepts_same_severity_and_name_only() {
        let group = IssuesGroup::new(Issue::new("1", Severity::High, "XSS", "https://x/1"));
        assert!(group.accepts(&Issue::new("2", Severity::High, "XSS", "https://x/2")));
        assert!(!group.accepts(&Issue::new("3", Severity::Low, "XSS", "https://x/3")));
        assert!(!group.accepts(&Issue::new("4", Severity::High, "SQLi", "https://x/4")));
    }
}
