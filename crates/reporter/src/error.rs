//! 리포터 에러 타입

use bright_core::error::{BrightError, ValidationError};

/// 리포터 도메인 에러
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportError {
    /// 필수 필드 누락 (예: 커밋 SHA)
    #[error("missing required field '{0}'")]
    MissingField(String),

    /// 잘못된 값
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl From<ReportError> for BrightError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::MissingField(field) => {
                BrightError::Validation(ValidationError::MissingField(field))
            }
            ReportError::InvalidValue { field, reason } => {
                BrightError::Validation(ValidationError::InvalidValue { field, reason })
            }
        }
    }
}
