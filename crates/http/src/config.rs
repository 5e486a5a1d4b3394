//! HTTP dispatcher 설정
//!
//! [`HttpDispatcherConfig`]는 core의 [`ApiConfig`]를 기반으로 dispatcher가
//! 사용하는 연결/레이트 리밋 설정을 제공합니다.
//!
//! # 사용 예시
//! ```ignore
//! use bright_http::config::HttpDispatcherConfig;
//!
//! let config = HttpDispatcherConfig::builder()
//!     .base_url("https://app.brightsec.com")
//!     .credentials(credentials)
//!     .rate(5, Duration::from_secs(1))
//!     .build()?;
//! ```

use std::time::Duration;

use bright_core::config::{ApiConfig, DEFAULT_API_URL};
use bright_core::credentials::Credentials;
use bright_core::error::{BrightError, ConfigError};

/// 설정 상한값 상수
const MAX_TIMEOUT: Duration = Duration::from_secs(600);
const MAX_SOCKETS: usize = 1024;

/// 레이트 리밋 설정
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateConfig {
    /// 윈도우당 최대 요청 수
    pub limit: u32,
    /// 윈도우 길이
    pub window: Duration,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            limit: 10,
            window: Duration::from_millis(60_000),
        }
    }
}

/// HTTP dispatcher 설정
///
/// `Debug` 출력의 토큰은 [`Credentials`]가 가립니다.
#[derive(Debug, Clone)]
pub struct HttpDispatcherConfig {
    /// API 기본 주소
    pub base_url: String,
    /// API 키
    pub credentials: Option<Credentials>,
    /// 클라이언트 기본 타임아웃 (요청별로는 커맨드 ttl이 우선)
    pub timeout: Duration,
    /// 레이트 리밋
    pub rate: RateConfig,
    /// keep-alive 사용 여부
    pub keep_alive: bool,
    /// 호스트당 최대 유휴 연결 수
    pub max_sockets: usize,
}

impl Default for HttpDispatcherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_owned(),
            credentials: None,
            timeout: Duration::from_millis(10_000),
            rate: RateConfig::default(),
            keep_alive: true,
            max_sockets: 50,
        }
    }
}

impl HttpDispatcherConfig {
    /// 빌더를 시작합니다.
    pub fn builder() -> HttpDispatcherConfigBuilder {
        HttpDispatcherConfigBuilder::new()
    }

    /// core의 `ApiConfig`와 자격 증명에서 설정을 생성합니다.
    pub fn from_api(api: &ApiConfig, credentials: Credentials) -> Self {
        Self {
            base_url: api.url.clone(),
            credentials: Some(credentials),
            timeout: Duration::from_millis(api.timeout_ms),
            rate: RateConfig {
                limit: api.rate_limit,
                window: Duration::from_millis(api.rate_window_ms),
            },
            keep_alive: api.keep_alive,
            max_sockets: api.max_sockets,
        }
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), BrightError> {
        let has_scheme =
            self.base_url.starts_with("http://") || self.base_url.starts_with("https://");
        if !has_scheme || self.base_url.chars().any(char::is_whitespace) {
            return Err(invalid("base_url", "must be an absolute http(s) url"));
        }

        if self.credentials.is_none() {
            return Err(invalid("credentials", "an API key is required"));
        }

        if self.timeout.is_zero() || self.timeout > MAX_TIMEOUT {
            return Err(invalid(
                "timeout",
                format!("must be 1ms-{}s", MAX_TIMEOUT.as_secs()),
            ));
        }

        if self.rate.limit == 0 {
            return Err(invalid("rate.limit", "must be greater than 0"));
        }

        if self.rate.window.is_zero() {
            return Err(invalid("rate.window", "must be greater than 0"));
        }

        if self.max_sockets == 0 || self.max_sockets > MAX_SOCKETS {
            return Err(invalid("max_sockets", format!("must be 1-{MAX_SOCKETS}")));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> BrightError {
    ConfigError::InvalidValue {
        field: format!("http.{field}"),
        reason: reason.into(),
    }
    .into()
}

/// HTTP dispatcher 설정 빌더
#[derive(Default)]
pub struct HttpDispatcherConfigBuilder {
    config: HttpDispatcherConfig,
}

impl HttpDispatcherConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.config.credentials = Some(credentials);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// 윈도우당 최대 요청 수를 설정합니다.
    pub fn rate(mut self, limit: u32, window: Duration) -> Self {
        self.config.rate = RateConfig { limit, window };
        self
    }

    pub fn keep_alive(mut self, keep_alive: bool) -> Self {
        self.config.keep_alive = keep_alive;
        self
    }

    pub fn max_sockets(mut self, max_sockets: usize) -> Self {
        self.config.max_sockets = max_sockets;
        self
    }

    /// 설정을 검증하고 반환합니다.
    pub fn build(self) -> Result<HttpDispatcherConfig, BrightError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials::new("abcdefg.nexa.abcdefghijklmnopqrstuvwxyz012345").unwrap()
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = HttpDispatcherConfig::default();
        assert_eq!(config.timeout, Duration::from_millis(10_000));
        assert_eq!(config.rate.limit, 10);
        assert_eq!(config.rate.window, Duration::from_millis(60_000));
        assert!(config.keep_alive);
        assert_eq!(config.max_sockets, 50);
    }

    #[test]
    fn default_without_credentials_fails_validation() {
        let err = HttpDispatcherConfig::default().validate().unwrap_err();
        assert!(err.to_string().contains("http.credentials"));
    }

    #[test]
    fn builder_produces_valid_config() {
        let config = HttpDispatcherConfig::builder()
            .base_url("http://localhost:8080")
            .credentials(credentials())
            .timeout(Duration::from_secs(2))
            .rate(5, Duration::from_secs(1))
            .keep_alive(false)
            .max_sockets(4)
            .build()
            .unwrap();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.rate.limit, 5);
        assert!(!config.keep_alive);
    }

    #[test]
    fn builder_rejects_out_of_range_values() {
        let base = || HttpDispatcherConfig::builder().credentials(credentials());
        assert!(base().base_url("localhost").build().is_err());
        assert!(base().timeout(Duration::ZERO).build().is_err());
        assert!(base().timeout(Duration::from_secs(3600)).build().is_err());
        assert!(base().rate(0, Duration::from_secs(1)).build().is_err());
        assert!(base().rate(1, Duration::ZERO).build().is_err());
        assert!(base().max_sockets(0).build().is_err());
    }

    #[test]
    fn from_api_copies_fields() {
        let api = ApiConfig {
            url: "https://eu.brightsec.com".to_owned(),
            rate_limit: 7,
            ..ApiConfig::default()
        };
        let config = HttpDispatcherConfig::from_api(&api, credentials());
        assert_eq!(config.base_url, "https://eu.brightsec.com");
        assert_eq!(config.rate.limit, 7);
        config.validate().unwrap();
    }

    #[test]
    fn debug_hides_token() {
        let config = HttpDispatcherConfig::builder()
            .credentials(credentials())
            .build()
            .unwrap();
        assert!(!format!("{config:?}").contains("abcdefghijklmnopqrstuvwxyz012345"));
    }
}
