//! 자격 증명: API 키 검증과 제공자 체인
//!
//! [`Credentials`]는 생성 시점에 토큰 형식을 검증하므로, 한 번 만들어진
//! 인스턴스는 항상 올바른 토큰을 담고 있습니다.
//!
//! [`CredentialProvider`]는 토큰을 찾지 못하면 에러가 아니라 `Ok(None)`을
//! 돌려줍니다. 토큰이 없는 것은 정상적인 결과입니다.

use std::fmt;
use std::sync::LazyLock;

use futures::future::BoxFuture;
use regex::Regex;
use tracing::debug;

use crate::error::{BrightError, CredentialsError};

/// 토큰을 읽는 환경변수
pub const TOKEN_ENV_VAR: &str = "BRIGHT_TOKEN";

static TOKEN_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9+/=]{7}\.nex[apr]\.[A-Za-z0-9+/=]{32}$")
        .unwrap_or_else(|e| unreachable!("token pattern is a valid regex: {e}"))
});

/// 검증된 API 키
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    token: String,
}

impl Credentials {
    /// 토큰 형식을 검증하여 자격 증명을 생성합니다.
    ///
    /// # Errors
    /// - 빈 토큰: [`CredentialsError::Missing`]
    /// - 형식 불일치: [`CredentialsError::Unrecognized`]
    pub fn new(token: impl Into<String>) -> Result<Self, CredentialsError> {
        let token = token.into();
        if token.is_empty() {
            return Err(CredentialsError::Missing);
        }
        if !TOKEN_FORMAT.is_match(&token) {
            return Err(CredentialsError::Unrecognized);
        }
        Ok(Self { token })
    }

    /// 토큰 원문
    pub fn token(&self) -> &str {
        &self.token
    }

    /// 로그와 화면 출력용으로 가린 토큰 (`abcdefg.nexa.***`)
    pub fn redacted(&self) -> String {
        redact_token(&self.token)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &self.redacted())
            .finish()
    }
}

/// 토큰에서 접두어(키 ID와 타입)만 남기고 나머지를 가립니다.
pub fn redact_token(token: &str) -> String {
    match token.rfind('.') {
        Some(pos) if pos > 0 => format!("{}.***REDACTED***", &token[..pos]),
        _ => "***REDACTED***".to_owned(),
    }
}

/// 자격 증명 제공자
///
/// 찾지 못한 경우 `Ok(None)`을 반환합니다.
pub trait CredentialProvider: Send + Sync {
    /// 제공자 이름 (로그용)
    fn name(&self) -> &str;

    /// 자격 증명을 조회합니다.
    fn get(&self) -> BoxFuture<'_, Result<Option<Credentials>, BrightError>>;
}

/// 환경변수에서 토큰을 읽는 제공자
#[derive(Debug, Clone)]
pub struct EnvCredentialProvider {
    var: String,
}

impl EnvCredentialProvider {
    /// 기본 환경변수(`BRIGHT_TOKEN`)를 읽는 제공자를 생성합니다.
    pub fn new() -> Self {
        Self::with_var(TOKEN_ENV_VAR)
    }

    /// 지정한 환경변수를 읽는 제공자를 생성합니다.
    pub fn with_var(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialProvider for EnvCredentialProvider {
    fn name(&self) -> &str {
        "env"
    }

    fn get(&self) -> BoxFuture<'_, Result<Option<Credentials>, BrightError>> {
        Box::pin(async move {
            match std::env::var(&self.var) {
                Ok(token) if !token.is_empty() => {
                    debug!(var = self.var.as_str(), "found token in environment");
                    Ok(Some(Credentials::new(token)?))
                }
                _ => Ok(None),
            }
        })
    }
}

/// 설정 파일이나 CLI 인자로 주어진 토큰을 제공하는 제공자
#[derive(Clone)]
pub struct StaticCredentialProvider {
    token: Option<String>,
}

impl StaticCredentialProvider {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }
}

impl fmt::Debug for StaticCredentialProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentialProvider")
            .field("token", &self.token.as_deref().map(redact_token))
            .finish()
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn name(&self) -> &str {
        "static"
    }

    fn get(&self) -> BoxFuture<'_, Result<Option<Credentials>, BrightError>> {
        Box::pin(async move {
            match self.token.as_deref() {
                Some(token) if !token.is_empty() => Ok(Some(Credentials::new(token)?)),
                _ => Ok(None),
            }
        })
    }
}
