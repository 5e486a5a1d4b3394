//! 스캔 API 에러 타입
//!
//! `From<ScanError> for BrightError` 변환으로 상위 레이어에 전파됩니다.

use bright_core::error::{BrightError, DispatchError, ValidationError};

/// 스캔 도메인 에러
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    /// 스캔 ID 형식 오류
    #[error("invalid scan id '{0}'")]
    InvalidId(String),

    /// 스캔 설정 검증 실패
    #[error("invalid scan config: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    /// 응답이 필요한 요청에 응답이 없음
    #[error("{method} {url} returned no reply")]
    MissingReply { method: String, url: String },
}

impl From<ScanError> for BrightError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::InvalidId(id) => BrightError::Validation(ValidationError::InvalidValue {
                field: "scan_id".to_owned(),
                reason: format!("'{id}' is not a valid scan id"),
            }),
            ScanError::InvalidConfig { field, reason } => {
                BrightError::Validation(ValidationError::InvalidValue { field, reason })
            }
            ScanError::MissingReply { method, url } => BrightError::Dispatch(DispatchError::Body {
                method,
                url,
                message: "reply expected but none was returned".to_owned(),
            }),
        }
    }
}
