//! 설정 관리: bright.toml 파싱 및 런타임 설정
//!
//! [`BrightConfig`]는 설정 파일의 최상위 구조체이고,
//! [`Configuration`]은 자격 증명까지 해석된 런타임 설정입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`BRIGHT_API_URL=https://...` 형식)
//! 3. 설정 파일 (`bright.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), bright_core::error::BrightError> {
//! use bright_core::config::{BrightConfig, Configuration};
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = BrightConfig::load("bright.toml").await?;
//!
//! // 자격 증명 해석 (설정 파일 토큰 → BRIGHT_TOKEN 순서)
//! let mut configuration = Configuration::from_config(&config);
//! configuration.load_credentials().await?;
//! let credentials = configuration.credentials()?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::credentials::{
    CredentialProvider, Credentials, EnvCredentialProvider, StaticCredentialProvider,
    redact_token,
};
use crate::error::{BrightError, ConfigError};

/// 기본 API 주소
pub const DEFAULT_API_URL: &str = "https://app.brightsec.com";

/// 재시도 최대 횟수 상한
const MAX_RETRIES_LIMIT: u32 = 10;

/// 동시 연결 수 상한
const MAX_SOCKETS_LIMIT: usize = 1024;

/// Bright 통합 설정
///
/// `bright.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrightConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// API 연결 설정
    #[serde(default)]
    pub api: ApiConfig,
    /// 재시도 설정
    #[serde(default)]
    pub retry: RetryConfig,
    /// 메시지 버스 설정
    #[serde(default)]
    pub bus: BusConfig,
}

impl BrightConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, BrightError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, BrightError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BrightError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                BrightError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        debug!(path = %path.display(), "configuration file loaded");
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, BrightError> {
        toml::from_str(toml_str).map_err(|e| {
            BrightError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `BRIGHT_{SECTION}_{FIELD}`
    /// 예: `BRIGHT_API_TIMEOUT_MS=30000`
    ///
    /// 토큰은 여기서 읽지 않습니다. `BRIGHT_TOKEN`은 [`EnvCredentialProvider`]가 담당합니다.
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "BRIGHT_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "BRIGHT_GENERAL_LOG_FORMAT");

        // API
        override_string(&mut self.api.url, "BRIGHT_API_URL");
        override_u64(&mut self.api.timeout_ms, "BRIGHT_API_TIMEOUT_MS");
        override_u32(&mut self.api.rate_limit, "BRIGHT_API_RATE_LIMIT");
        override_u64(&mut self.api.rate_window_ms, "BRIGHT_API_RATE_WINDOW_MS");
        override_bool(&mut self.api.keep_alive, "BRIGHT_API_KEEP_ALIVE");
        override_usize(&mut self.api.max_sockets, "BRIGHT_API_MAX_SOCKETS");

        // Retry
        override_string(&mut self.retry.strategy, "BRIGHT_RETRY_STRATEGY");
        override_u32(&mut self.retry.max_retries, "BRIGHT_RETRY_MAX_RETRIES");
        override_u64(&mut self.retry.base_delay_ms, "BRIGHT_RETRY_BASE_DELAY_MS");
        override_u64(&mut self.retry.max_delay_ms, "BRIGHT_RETRY_MAX_DELAY_MS");

        // Bus
        override_optional_string(&mut self.bus.url, "BRIGHT_BUS_URL");
        override_string(&mut self.bus.exchange, "BRIGHT_BUS_EXCHANGE");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), BrightError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        if !is_http_url(&self.api.url) {
            return Err(invalid(
                "api.url",
                "must be an absolute http:// or https:// url without whitespace",
            ));
        }

        if self.api.timeout_ms == 0 {
            return Err(invalid("api.timeout_ms", "must be greater than 0"));
        }

        if self.api.rate_limit == 0 {
            return Err(invalid("api.rate_limit", "must be greater than 0"));
        }

        if self.api.rate_window_ms == 0 {
            return Err(invalid("api.rate_window_ms", "must be greater than 0"));
        }

        if self.api.max_sockets == 0 || self.api.max_sockets > MAX_SOCKETS_LIMIT {
            return Err(invalid(
                "api.max_sockets",
                format!("must be between 1 and {MAX_SOCKETS_LIMIT}"),
            ));
        }

        let valid_strategies = ["none", "fixed", "exponential"];
        if !valid_strategies.contains(&self.retry.strategy.as_str()) {
            return Err(invalid(
                "retry.strategy",
                format!("must be one of: {}", valid_strategies.join(", ")),
            ));
        }

        if self.retry.max_retries > MAX_RETRIES_LIMIT {
            return Err(invalid(
                "retry.max_retries",
                format!("must not exceed {MAX_RETRIES_LIMIT}"),
            ));
        }

        if self.retry.max_delay_ms < self.retry.base_delay_ms {
            return Err(invalid(
                "retry.max_delay_ms",
                "must be greater than or equal to base_delay_ms",
            ));
        }

        if let Some(url) = self.bus.url.as_deref() {
            if url.is_empty() || url.chars().any(char::is_whitespace) {
                return Err(invalid("bus.url", "must not be empty or contain whitespace"));
            }
        }

        if self.bus.exchange.is_empty() {
            return Err(invalid("bus.exchange", "must not be empty"));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> BrightError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason: reason.into(),
    }
    .into()
}

fn is_http_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    match rest {
        Some(host) => !host.is_empty() && !url.chars().any(char::is_whitespace),
        None => false,
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// API 연결 설정
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API 기본 주소
    pub url: String,
    /// API 키 (없으면 `BRIGHT_TOKEN` 환경변수를 사용)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// 요청 기본 타임아웃 (밀리초)
    pub timeout_ms: u64,
    /// 윈도우당 최대 요청 수
    pub rate_limit: u32,
    /// 레이트 리밋 윈도우 (밀리초)
    pub rate_window_ms: u64,
    /// HTTP keep-alive 사용 여부
    pub keep_alive: bool,
    /// 호스트당 최대 유휴 연결 수
    pub max_sockets: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_API_URL.to_owned(),
            token: None,
            timeout_ms: 10_000,
            rate_limit: 10,
            rate_window_ms: 60_000,
            keep_alive: true,
            max_sockets: 50,
        }
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("url", &self.url)
            .field("token", &self.token.as_deref().map(redact_token))
            .field("timeout_ms", &self.timeout_ms)
            .field("rate_limit", &self.rate_limit)
            .field("rate_window_ms", &self.rate_window_ms)
            .field("keep_alive", &self.keep_alive)
            .field("max_sockets", &self.max_sockets)
            .finish()
    }
}

/// 재시도 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// 재시도 전략 (none, fixed, exponential)
    pub strategy: String,
    /// 첫 시도 이후 재시도 최대 횟수
    pub max_retries: u32,
    /// 첫 재시도 대기 시간 (밀리초)
    pub base_delay_ms: u64,
    /// 대기 시간 상한 (밀리초)
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            strategy: "exponential".to_owned(),
            max_retries: 3,
            base_delay_ms: 500,
            max_delay_ms: 10_000,
        }
    }
}

/// 메시지 버스 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// 브로커 주소 (없으면 프로세스 내부 버스만 사용)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// 익스체인지 이름
    pub exchange: String,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            url: None,
            exchange: "EventBus".to_owned(),
        }
    }
}

/// 런타임 설정: API 주소, 버스 주소, 자격 증명
///
/// 자격 증명은 [`Configuration::load_credentials`]가 제공자를 순서대로
/// 조회하여 채웁니다. 첫 번째로 값을 돌려준 제공자가 이깁니다.
pub struct Configuration {
    api: ApiConfig,
    bus: Option<String>,
    credentials: Option<Credentials>,
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl Configuration {
    /// 설정 파일 모델에서 런타임 설정을 생성합니다.
    ///
    /// 기본 제공자 순서: 설정 파일의 `api.token` → `BRIGHT_TOKEN` 환경변수
    pub fn from_config(config: &BrightConfig) -> Self {
        Self {
            api: config.api.clone(),
            bus: config.bus.url.clone(),
            credentials: None,
            providers: vec![
                Box::new(StaticCredentialProvider::new(config.api.token.clone())),
                Box::new(EnvCredentialProvider::new()),
            ],
        }
    }

    /// 제공자 목록을 교체합니다.
    pub fn with_providers(mut self, providers: Vec<Box<dyn CredentialProvider>>) -> Self {
        self.providers = providers;
        self
    }

    /// 자격 증명을 직접 지정합니다. 이후 `load_credentials`는 제공자를 조회하지 않습니다.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// API 연결 설정
    pub fn api(&self) -> &ApiConfig {
        &self.api
    }

    /// 버스 주소
    pub fn bus(&self) -> Option<&str> {
        self.bus.as_deref()
    }

    /// 제공자를 순서대로 조회하여 자격 증명을 채웁니다.
    ///
    /// 이미 자격 증명이 있으면 아무것도 하지 않습니다.
    /// 제공자 에러(형식이 잘못된 토큰 등)는 그대로 전파됩니다.
    pub async fn load_credentials(&mut self) -> Result<(), BrightError> {
        if self.credentials.is_some() {
            return Ok(());
        }

        for provider in &self.providers {
            if let Some(credentials) = provider.get().await? {
                debug!(provider = provider.name(), "credentials resolved");
                self.credentials = Some(credentials);
                return Ok(());
            }
        }

        warn!("no credential provider returned an API key");
        Ok(())
    }

    /// 로드된 자격 증명을 돌려줍니다.
    ///
    /// # Errors
    /// 자격 증명이 없으면 [`BrightError::IllegalOperation`]
    pub fn credentials(&self) -> Result<&Credentials, BrightError> {
        self.credentials.as_ref().ok_or_else(|| {
            BrightError::illegal_operation("Configuration", "please provide credentials")
        })
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let providers: Vec<&str> = self.providers.iter().map(|p| p.name()).collect();
        f.debug_struct("Configuration")
            .field("api", &self.api)
            .field("bus", &self.bus)
            .field("credentials", &self.credentials)
            .field("providers", &providers)
            .finish()
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_optional_string(target: &mut Option<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = if val.is_empty() { None } else { Some(val) };
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    override_parsed(target, env_key, "bool");
}

fn override_usize(target: &mut usize, env_key: &str) {
    override_parsed(target, env_key, "usize");
}

fn override_u32(target: &mut u32, env_key: &str) {
    override_parsed(target, env_key, "u32");
}

fn override_u64(target: &mut u64, env_key: &str) {
    override_parsed(target, env_key, "u64");
}

fn override_parsed<T: std::str::FromStr>(target: &mut T, env_key: &str, type_name: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<T>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                expected = type_name,
                "failed to parse env var, ignoring"
            ),
        }
    }
}
