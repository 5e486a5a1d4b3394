//! 이벤트 버스 에러 타입
//!
//! `From<BusError> for BrightError` 변환으로 `?` 연산자를 통해 상위로 전파됩니다.

use bright_core::error::{BrightError, ConfigError, ValidationError};

/// 이벤트 버스 도메인 에러
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BusError {
    /// 커맨드를 처리할 핸들러가 없음
    #[error("no handler registered for '{0}'")]
    NoHandler(String),

    /// 비어 있는 메시지 이름으로 등록 시도
    #[error("message type must not be empty")]
    EmptyMessageType,

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config { field: String, reason: String },
}

impl From<BusError> for BrightError {
    fn from(err: BusError) -> Self {
        match err {
            BusError::NoHandler(message_type) => BrightError::illegal_operation(
                "EventBus",
                format!("no handler registered for '{message_type}'"),
            ),
            BusError::EmptyMessageType => {
                BrightError::Validation(ValidationError::MissingField("message_type".to_owned()))
            }
            BusError::Config { field, reason } => {
                BrightError::Config(ConfigError::InvalidValue { field, reason })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_handler_becomes_illegal_operation() {
        let err: BrightError = BusError::NoHandler("StopScan".to_owned()).into();
        match err {
            BrightError::IllegalOperation { component, reason } => {
                assert_eq!(component, "EventBus");
                assert!(reason.contains("StopScan"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn empty_message_type_becomes_validation_error() {
        let err: BrightError = BusError::EmptyMessageType.into();
        assert!(matches!(
            err,
            BrightError::Validation(ValidationError::MissingField(ref f)) if f == "message_type"
        ));
    }

    #[test]
    fn config_error_keeps_field() {
        let err: BrightError = BusError::Config {
            field: "bus.exchange".to_owned(),
            reason: "must not be empty".to_owned(),
        }
        .into();
        assert!(err.to_string().contains("bus.exchange"));
    }
}
