//! bright.toml 통합 설정 테스트
//!
//! - bright.toml.example 파싱 테스트
//! - 부분 설정 (일부 섹션만) 로딩 테스트
//! - 환경변수 우선순위 테스트
//! - 빈 파일 / 잘못된 형식 에러 테스트

use std::io::Write;

use bright_core::config::{BrightConfig, Configuration};
use bright_core::credentials::{CredentialProvider, StaticCredentialProvider};
use bright_core::error::{BrightError, ConfigError};

const EXAMPLE: &str = include_str!("../../../bright.toml.example");

// =============================================================================
// bright.toml.example 파싱 테스트
// =============================================================================

#[test]
fn example_config_parses_successfully() {
    let config = BrightConfig::parse(EXAMPLE).expect("example config should parse");

    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.general.log_format, "pretty");
    assert_eq!(config.api.url, "https://app.brightsec.com");
    assert!(config.api.token.is_none());
}

#[test]
fn example_config_passes_validation() {
    let config = BrightConfig::parse(EXAMPLE).expect("should parse");
    config
        .validate()
        .expect("example config should pass validation");
}

#[test]
fn example_config_matches_code_defaults() {
    let example = BrightConfig::parse(EXAMPLE).expect("should parse");
    let defaults = BrightConfig::default();

    assert_eq!(example.general.log_level, defaults.general.log_level);
    assert_eq!(example.general.log_format, defaults.general.log_format);
    assert_eq!(example.api.url, defaults.api.url);
    assert_eq!(example.api.timeout_ms, defaults.api.timeout_ms);
    assert_eq!(example.api.rate_limit, defaults.api.rate_limit);
    assert_eq!(example.api.rate_window_ms, defaults.api.rate_window_ms);
    assert_eq!(example.api.keep_alive, defaults.api.keep_alive);
    assert_eq!(example.api.max_sockets, defaults.api.max_sockets);
    assert_eq!(example.retry.strategy, defaults.retry.strategy);
    assert_eq!(example.retry.max_retries, defaults.retry.max_retries);
    assert_eq!(example.retry.base_delay_ms, defaults.retry.base_delay_ms);
    assert_eq!(example.retry.max_delay_ms, defaults.retry.max_delay_ms);
    assert_eq!(example.bus.url, defaults.bus.url);
    assert_eq!(example.bus.exchange, defaults.bus.exchange);
}

// =============================================================================
// 부분 설정 로딩 테스트
// =============================================================================

#[test]
fn partial_config_api_only() {
    let toml = r#"
[api]
url = "http://localhost:3000"
timeout_ms = 2500
"#;
    let config = BrightConfig::parse(toml).expect("should parse");
    config.validate().expect("should validate");

    assert_eq!(config.api.url, "http://localhost:3000");
    assert_eq!(config.api.timeout_ms, 2500);
    assert_eq!(config.api.rate_limit, 10);
    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.retry.strategy, "exponential");
}

#[test]
fn partial_config_retry_only() {
    let toml = r#"
[retry]
strategy = "none"
"#;
    let config = BrightConfig::parse(toml).expect("should parse");
    config.validate().expect("should validate");

    assert_eq!(config.retry.strategy, "none");
    assert_eq!(config.retry.max_retries, 3);
    assert_eq!(config.api.url, "https://app.brightsec.com");
}

#[test]
fn partial_config_with_token() {
    let toml = r#"
[api]
token = "abcdefg.nexa.abcdefghijklmnopqrstuvwxyz012345"
"#;
    let config = BrightConfig::parse(toml).expect("should parse");
    assert_eq!(
        config.api.token.as_deref(),
        Some("abcdefg.nexa.abcdefghijklmnopqrstuvwxyz012345")
    );
}

// =============================================================================
// 환경변수 우선순위 테스트
// =============================================================================

#[test]
#[serial_test::serial]
fn env_override_takes_precedence_over_toml() {
    let toml = r#"
[api]
url = "https://app.brightsec.com"
rate_limit = 10
"#;

    // SAFETY: serial 테스트에서만 환경변수를 조작합니다.
    unsafe {
        std::env::set_var("BRIGHT_API_URL", "https://eu.brightsec.com");
        std::env::set_var("BRIGHT_API_RATE_LIMIT", "42");
    }

    let mut config = BrightConfig::parse(toml).expect("should parse");
    config.apply_env_overrides();
    let url = config.api.url.clone();
    let rate = config.api.rate_limit;

    // SAFETY: 테스트 정리
    unsafe {
        std::env::remove_var("BRIGHT_API_URL");
        std::env::remove_var("BRIGHT_API_RATE_LIMIT");
    }

    assert_eq!(url, "https://eu.brightsec.com");
    assert_eq!(rate, 42);
}

#[test]
#[serial_test::serial]
fn env_override_missing_var_keeps_toml_value() {
    let toml = r#"
[general]
log_level = "warn"
"#;

    // SAFETY: 존재하지 않는 변수를 명시적으로 제거
    unsafe {
        std::env::remove_var("BRIGHT_GENERAL_LOG_LEVEL");
    }

    let mut config = BrightConfig::parse(toml).expect("should parse");
    config.apply_env_overrides();

    assert_eq!(config.general.log_level, "warn");
}

#[test]
#[serial_test::serial]
fn env_override_empty_bus_url_clears_value() {
    let toml = r#"
[bus]
url = "amqp://localhost:5672"
"#;

    // SAFETY: serial 테스트에서만 환경변수를 조작합니다.
    unsafe {
        std::env::set_var("BRIGHT_BUS_URL", "");
    }

    let mut config = BrightConfig::parse(toml).expect("should parse");
    config.apply_env_overrides();

    // SAFETY: 테스트 정리
    unsafe {
        std::env::remove_var("BRIGHT_BUS_URL");
    }

    assert!(config.bus.url.is_none());
}

#[tokio::test]
#[serial_test::serial]
async fn env_override_invalid_value_fails_validation_on_load() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[retry]\nstrategy = \"fixed\"").expect("write");

    // SAFETY: serial 테스트에서만 환경변수를 조작합니다.
    unsafe {
        std::env::set_var("BRIGHT_RETRY_STRATEGY", "sometimes");
    }

    let result = BrightConfig::load(file.path()).await;

    // SAFETY: 테스트 정리
    unsafe {
        std::env::remove_var("BRIGHT_RETRY_STRATEGY");
    }

    assert!(matches!(
        result,
        Err(BrightError::Config(ConfigError::InvalidValue { ref field, .. })) if field == "retry.strategy"
    ));
}

// =============================================================================
// 빈 파일 / 잘못된 형식 에러 테스트
// =============================================================================

#[test]
fn empty_string_parses_with_defaults() {
    let config = BrightConfig::parse("").expect("should parse");
    config.validate().expect("defaults should validate");
    assert_eq!(config.api.max_sockets, 50);
}

#[test]
fn comments_only_parses_with_defaults() {
    let config = BrightConfig::parse("# nothing here\n# still nothing\n").expect("should parse");
    assert_eq!(config.bus.exchange, "EventBus");
}

#[test]
fn malformed_toml_returns_parse_error() {
    let result = BrightConfig::parse("[api\nurl = \"x\"");
    assert!(matches!(
        result,
        Err(BrightError::Config(ConfigError::ParseFailed { .. }))
    ));
}

#[test]
fn wrong_type_for_numeric_field() {
    let result = BrightConfig::parse("[api]\ntimeout_ms = \"slow\"\n");
    assert!(matches!(
        result,
        Err(BrightError::Config(ConfigError::ParseFailed { .. }))
    ));
}

#[test]
fn unknown_section_is_ignored() {
    let toml = r#"
[future_feature]
enabled = true

[api]
rate_limit = 3
"#;
    let config = BrightConfig::parse(toml).expect("unknown sections should be ignored");
    assert_eq!(config.api.rate_limit, 3);
}

#[tokio::test]
async fn from_file_nonexistent_returns_file_not_found() {
    let result = BrightConfig::from_file("/tmp/bright_test_nonexistent_12345.toml").await;
    assert!(matches!(
        result,
        Err(BrightError::Config(ConfigError::FileNotFound { .. }))
    ));
}

#[tokio::test]
async fn from_file_rejects_invalid_values() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[api]\nmax_sockets = 0").expect("write");

    let result = BrightConfig::from_file(file.path()).await;
    assert!(matches!(
        result,
        Err(BrightError::Config(ConfigError::InvalidValue { .. }))
    ));
}

#[tokio::test]
async fn load_example_config_from_disk() {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let example_path = format!("{manifest_dir}/../../bright.toml.example");

    let config = BrightConfig::from_file(&example_path)
        .await
        .expect("example config should load");
    assert_eq!(config.general.log_level, "info");
}

// =============================================================================
// 런타임 설정 테스트
// =============================================================================

#[tokio::test]
async fn configuration_resolves_token_from_file() {
    let toml = r#"
[api]
url = "http://localhost:3000"
token = "abcdefg.nexa.abcdefghijklmnopqrstuvwxyz012345"

[bus]
url = "amqp://localhost:5672"
"#;
    let config = BrightConfig::parse(toml).expect("should parse");
    let mut configuration = Configuration::from_config(&config);
    configuration
        .load_credentials()
        .await
        .expect("token should be valid");

    assert_eq!(configuration.api().url, "http://localhost:3000");
    assert_eq!(configuration.bus(), Some("amqp://localhost:5672"));
    assert_eq!(
        configuration.credentials().expect("loaded").token(),
        "abcdefg.nexa.abcdefghijklmnopqrstuvwxyz012345"
    );
}

#[tokio::test]
async fn configuration_malformed_token_is_an_error() {
    let provider = StaticCredentialProvider::new(Some("not-a-token".to_owned()));
    assert!(provider.get().await.is_err());

    let mut configuration = Configuration::from_config(&BrightConfig::default())
        .with_providers(vec![Box::new(provider)]);
    let err = configuration
        .load_credentials()
        .await
        .expect_err("malformed token must fail");
    assert!(matches!(err, BrightError::Credentials(_)));
}

// =============================================================================
// 직렬화 라운드트립 테스트
// =============================================================================

#[test]
fn serialize_and_reparse_roundtrip() {
    let original = BrightConfig::default();
    let toml_str = toml::to_string_pretty(&original).expect("should serialize");
    let parsed = BrightConfig::parse(&toml_str).expect("should reparse");
    parsed.validate().expect("reparsed should validate");

    assert_eq!(original.general.log_format, parsed.general.log_format);
    assert_eq!(original.api.rate_window_ms, parsed.api.rate_window_ms);
    assert_eq!(original.retry.strategy, parsed.retry.strategy);
    assert!(!toml_str.contains("token"));
}
