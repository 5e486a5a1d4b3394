//! 에러 타입: 도메인별 에러 정의
//!
//! [`BrightError`]가 최상위 에러이며, 각 하위 크레이트의 에러는
//! `From` 변환을 통해 `?` 연산자로 전파됩니다.

/// Bright SDK 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum BrightError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 자격 증명(API 키) 에러
    #[error("credentials error: {0}")]
    Credentials(#[from] CredentialsError),

    /// 입력값 검증 실패 (생성 시점에 동기적으로 발생)
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// 원격 호출 실패 (재시도 소진 후 전달됨)
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// 필수 초기화 없이 컴포넌트를 사용한 경우
    #[error("illegal operation in {component}: {reason}")]
    IllegalOperation { component: String, reason: String },

    /// 알 수 없는 심각도 값: 스캔 서비스와의 데이터 계약 위반
    #[error("unknown severity: '{0}'")]
    UnknownSeverity(String),

    /// JSON 직렬화/역직렬화 실패
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl BrightError {
    /// 필수 초기화 누락 에러를 생성합니다.
    pub fn illegal_operation(component: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::IllegalOperation {
            component: component.into(),
            reason: reason.into(),
        }
    }

    /// 재시도할 가치가 있는 에러인지 판단합니다.
    ///
    /// 타임아웃, 전송 에러, 429, 5xx만 재시도 대상입니다.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Dispatch(e) => e.is_retryable(),
            _ => false,
        }
    }
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 자격 증명 에러
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialsError {
    /// 토큰이 비어 있음
    #[error("please provide an API key")]
    Missing,

    /// 토큰 형식이 올바르지 않음
    #[error("unable to recognize the API key")]
    Unrecognized,
}

/// 입력값 검증 에러
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// 잘못된 URL
    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// 지원하지 않는 HTTP 메서드
    #[error("invalid http method '{0}'")]
    InvalidMethod(String),

    /// 필수 필드 누락 (예: 커밋 SHA)
    #[error("missing required field '{0}'")]
    MissingField(String),

    /// 범위를 벗어난 값
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 원격 호출 에러
///
/// HTTP 실패를 감싸며 `status`, `code`, `method`와 사람이 읽을 수 있는 메시지를 노출합니다.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// 2xx 이외의 응답
    #[error("{method} {url} failed with status {status}: {message}")]
    Status {
        method: String,
        url: String,
        status: u16,
        code: String,
        message: String,
    },

    /// 요청 타임아웃 (ttl 초과)
    #[error("{method} {url} timed out after {ttl_ms}ms")]
    Timeout {
        method: String,
        url: String,
        ttl_ms: u64,
    },

    /// 연결 실패 등 전송 계층 에러
    #[error("{method} {url} transport error: {message}")]
    Transport {
        method: String,
        url: String,
        message: String,
    },

    /// 응답 본문 디코딩 또는 스트림 소비 실패
    #[error("{method} {url} failed to read reply: {message}")]
    Body {
        method: String,
        url: String,
        message: String,
    },
}

/// 타임아웃 에러 코드
pub const CODE_TIMEOUT: &str = "ECONNABORTED";
/// 전송 계층 에러 코드
pub const CODE_NETWORK: &str = "ERR_NETWORK";
/// 4xx 응답 에러 코드
pub const CODE_BAD_REQUEST: &str = "ERR_BAD_REQUEST";
/// 5xx 응답 에러 코드
pub const CODE_BAD_RESPONSE: &str = "ERR_BAD_RESPONSE";
/// 본문 처리 에러 코드
pub const CODE_BAD_BODY: &str = "ERR_BAD_BODY";

impl DispatchError {
    /// HTTP 상태 코드 (응답을 받은 경우에만)
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 에러 코드
    pub fn code(&self) -> &str {
        match self {
            Self::Status { code, .. } => code,
            Self::Timeout { .. } => CODE_TIMEOUT,
            Self::Transport { .. } => CODE_NETWORK,
            Self::Body { .. } => CODE_BAD_BODY,
        }
    }

    /// 요청 메서드
    pub fn method(&self) -> &str {
        match self {
            Self::Status { method, .. }
            | Self::Timeout { method, .. }
            | Self::Transport { method, .. }
            | Self::Body { method, .. } => method,
        }
    }

    /// 사용자에게 보여줄 메시지
    pub fn message(&self) -> String {
        match self {
            Self::Status { message, .. }
            | Self::Transport { message, .. }
            | Self::Body { message, .. } => message.clone(),
            Self::Timeout { ttl_ms, .. } => format!("timeout of {ttl_ms}ms exceeded"),
        }
    }

    /// 타임아웃 여부
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// 재시도 대상 여부
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Transport { .. } => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Body { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_error(status: u16) -> DispatchError {
        DispatchError::Status {
            method: "GET".to_owned(),
            url: "https://example.com/api".to_owned(),
            status,
            code: if status >= 500 {
                CODE_BAD_RESPONSE.to_owned()
            } else {
                CODE_BAD_REQUEST.to_owned()
            },
            message: "boom".to_owned(),
        }
    }

    #[test]
    fn credentials_error_messages_are_distinct() {
        assert_eq!(CredentialsError::Missing.to_string(), "please provide an API key");
        assert_eq!(
            CredentialsError::Unrecognized.to_string(),
            "unable to recognize the API key"
        );
    }

    #[test]
    fn dispatch_error_exposes_status_code_and_method() {
        let err = status_error(404);
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.code(), CODE_BAD_REQUEST);
        assert_eq!(err.method(), "GET");
        assert_eq!(err.message(), "boom");
    }

    #[test]
    fn timeout_is_retryable_and_flagged() {
        let err = DispatchError::Timeout {
            method: "POST".to_owned(),
            url: "https://example.com".to_owned(),
            ttl_ms: 1,
        };
        assert!(err.is_timeout());
        assert!(err.is_retryable());
        assert_eq!(err.code(), CODE_TIMEOUT);
        assert_eq!(err.status(), None);
        assert!(err.message().contains("timeout"));
    }

    #[test]
    fn only_server_errors_and_throttling_are_retryable() {
        assert!(status_error(500).is_retryable());
        assert!(status_error(503).is_retryable());
        assert!(status_error(429).is_retryable());
        assert!(!status_error(400).is_retryable());
        assert!(!status_error(401).is_retryable());
    }

    #[test]
    fn bright_error_retryable_delegates_to_dispatch() {
        let err: BrightError = status_error(502).into();
        assert!(err.is_retryable());

        let err: BrightError = CredentialsError::Missing.into();
        assert!(!err.is_retryable());
    }

    #[test]
    fn illegal_operation_names_component() {
        let err = BrightError::illegal_operation("Configuration", "please provide credentials");
        let msg = err.to_string();
        assert!(msg.contains("Configuration"));
        assert!(msg.contains("please provide credentials"));
    }
}
