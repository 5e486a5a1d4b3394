//! 스캔 API 커맨드
//!
//! 각 함수는 검증된 [`HttpRequest`]를 만들 뿐 전송하지 않습니다.
//! 전송은 [`RestScans`](crate::RestScans)나 호출자가 고른 dispatcher의 몫입니다.

use serde_json::Value;

use bright_core::error::BrightError;
use bright_core::types::Issue;
use bright_http::{FormData, HttpMethod, HttpRequest, Json};

use crate::error::ScanError;
use crate::models::{Created, HAR_CONTENT_TYPE, HarFile, ScanConfig, ScanState};

/// 스캔 API 경로
pub const SCANS_PATH: &str = "/api/v1/scans";
/// 파일 업로드 경로
pub const FILES_PATH: &str = "/api/v1/files";

/// 스캔 생성
pub type CreateScan = HttpRequest<Json<ScanConfig>, Created>;
/// 스캔 상태 조회
pub type GetScanStatus = HttpRequest<(), ScanState>;
/// 스캔 이슈 목록 조회
pub type ListIssues = HttpRequest<(), Vec<Issue>>;
/// 응답 본문 없는 요청 (중지, 삭제)
pub type NoReply = HttpRequest<(), Value>;
/// HAR 파일 업로드
pub type UploadHar = HttpRequest<FormData, Created>;

/// 스캔 ID를 검증합니다.
///
/// 경로 세그먼트로 그대로 쓰이므로 영숫자와 `-`, `_`만 허용합니다.
pub fn validate_scan_id(id: &str) -> Result<(), ScanError> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ScanError::InvalidId(id.to_owned()))
    }
}

pub fn create_scan(config: ScanConfig) -> Result<CreateScan, BrightError> {
    config.validate()?;
    HttpRequest::builder(Json(config))
        .url(SCANS_PATH)
        .method(HttpMethod::Post)
        .message_type("CreateScan")
        .build()
}

pub fn get_scan_status(id: &str) -> Result<GetScanStatus, BrightError> {
    validate_scan_id(id)?;
    HttpRequest::builder(())
        .url(format!("{SCANS_PATH}/{id}"))
        .method(HttpMethod::Get)
        .message_type("GetScanStatus")
        .build()
}

pub fn list_issues(id: &str) -> Result<ListIssues, BrightError> {
    validate_scan_id(id)?;
    HttpRequest::builder(())
        .url(format!("{SCANS_PATH}/{id}/issues"))
        .method(HttpMethod::Get)
        .message_type("ListScanIssues")
        .build()
}

/// 스캔 중지 (응답 본문은 버립니다)
pub fn stop_scan(id: &str) -> Result<NoReply, BrightError> {
    validate_scan_id(id)?;
    HttpRequest::builder(())
        .url(format!("{SCANS_PATH}/{id}/stop"))
        .method(HttpMethod::Get)
        .message_type("StopScan")
        .expect_reply(false)
        .build()
}

/// 스캔 삭제 (응답 본문은 버립니다)
pub fn delete_scan(id: &str) -> Result<NoReply, BrightError> {
    validate_scan_id(id)?;
    HttpRequest::builder(())
        .url(format!("{SCANS_PATH}/{id}"))
        .method(HttpMethod::Delete)
        .message_type("DeleteScan")
        .expect_reply(false)
        .build()
}

/// HAR 파일을 `file` 필드에 담아 업로드합니다.
pub fn upload_har(har: HarFile) -> Result<UploadHar, BrightError> {
    if har.file_name.trim().is_empty() {
        return Err(ScanError::InvalidConfig {
            field: "file_name".to_owned(),
            reason: "must not be empty".to_owned(),
        }
        .into());
    }
    let discard = har.discard.to_string();
    let form = FormData::new().file("file", har.file_name, HAR_CONTENT_TYPE, har.content);
    HttpRequest::builder(form)
        .url(FILES_PATH)
        .method(HttpMethod::Post)
        .param("discard", discard)
        .message_type("UploadHar")
        .build()
}
