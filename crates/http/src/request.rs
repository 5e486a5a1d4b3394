//! HTTP 요청 커맨드: [`Command`]에 url, 메서드, 쿼리 파라미터를 더한 메시지
//!
//! [`HttpRequestBuilder::build`]가 url과 ttl을 검증하므로, 만들어진
//! [`HttpRequest`]는 항상 전송 가능한 상태입니다.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use bright_core::dispatcher::CommandDispatcher;
use bright_core::error::{BrightError, ValidationError};
use bright_core::message::{AsCommand, Command};

/// HTTP 메서드
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    /// 대문자 메서드 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ValidationError;

    /// 대소문자를 구분하지 않습니다.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            _ => Err(ValidationError::InvalidMethod(s.to_owned())),
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Options => reqwest::Method::OPTIONS,
        }
    }
}

/// REST API로 전송되는 커맨드
///
/// `T`는 요청 본문, `R`은 응답 타입입니다.
pub struct HttpRequest<T, R> {
    command: Command<T, R>,
    url: String,
    method: HttpMethod,
    params: Option<Vec<(String, String)>>,
}

impl<T, R> HttpRequest<T, R> {
    /// 본문을 받아 빌더를 시작합니다.
    pub fn builder(payload: T) -> HttpRequestBuilder<T, R> {
        HttpRequestBuilder::new(payload)
    }

    /// 요청 경로 또는 절대 URL
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// 쿼리 파라미터 (순서 유지)
    pub fn params(&self) -> Option<&[(String, String)]> {
        self.params.as_deref()
    }

    /// 내부 커맨드 (메타데이터, ttl, expect_reply)
    pub fn command(&self) -> &Command<T, R> {
        &self.command
    }

    pub fn payload(&self) -> &T {
        self.command.payload()
    }

    pub fn correlation_id(&self) -> &str {
        self.command.correlation_id()
    }

    pub fn expect_reply(&self) -> bool {
        self.command.expect_reply()
    }

    pub fn ttl(&self) -> Duration {
        self.command.ttl()
    }

    /// dispatcher를 통해 요청을 실행합니다.
    pub async fn execute<D>(self, dispatcher: &D) -> Result<Option<R>, BrightError>
    where
        D: CommandDispatcher<Self>,
        T: Send,
    {
        dispatcher.execute(self).await
    }
}

impl<T: Send, R> AsCommand for HttpRequest<T, R> {
    type Payload = T;
    type Reply = R;

    fn as_command(&self) -> &Command<T, R> {
        &self.command
    }
}

impl<T: Clone, R> Clone for HttpRequest<T, R> {
    fn clone(&self) -> Self {
        Self {
            command: self.command.clone(),
            url: self.url.clone(),
            method: self.method,
            params: self.params.clone(),
        }
    }
}

impl<T: fmt::Debug, R> fmt::Debug for HttpRequest<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("params", &self.params)
            .field("command", &self.command)
            .finish()
    }
}

/// [`HttpRequest`] 빌더
///
/// 기본값: url `/`, 메서드 GET, 파라미터 없음, `expect_reply = true`, ttl 10초
pub struct HttpRequestBuilder<T, R> {
    command: Command<T, R>,
    url: String,
    method: HttpMethod,
    params: Option<Vec<(String, String)>>,
}

impl<T, R> HttpRequestBuilder<T, R> {
    /// 새 빌더를 생성합니다.
    pub fn new(payload: T) -> Self {
        Self {
            command: Command::new(payload),
            url: "/".to_owned(),
            method: HttpMethod::Get,
            params: None,
        }
    }

    /// 요청 경로(`/api/v1/...`) 또는 절대 URL을 설정합니다.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// 문자열에서 메서드를 설정합니다.
    ///
    /// # Errors
    /// 알 수 없는 메서드면 [`ValidationError::InvalidMethod`]
    pub fn method_str(mut self, method: &str) -> Result<Self, BrightError> {
        self.method = method.parse()?;
        Ok(self)
    }

    /// 쿼리 파라미터를 하나 추가합니다.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params
            .get_or_insert_with(Vec::new)
            .push((key.into(), value.into()));
        self
    }

    /// 쿼리 파라미터를 통째로 설정합니다.
    pub fn params(mut self, params: Vec<(String, String)>) -> Self {
        self.params = Some(params);
        self
    }

    pub fn message_type(mut self, message_type: impl Into<String>) -> Self {
        self.command = self.command.with_type(message_type);
        self
    }

    pub fn correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.command = self.command.with_correlation_id(correlation_id);
        self
    }

    pub fn expect_reply(mut self, expect_reply: bool) -> Self {
        self.command = self.command.with_expect_reply(expect_reply);
        self
    }

    /// 요청 타임아웃
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.command = self.command.with_ttl(ttl);
        self
    }

    /// 검증 후 요청을 생성합니다.
    ///
    /// # Errors
    /// - url이 비었거나 공백을 포함하거나, `/`로 시작하는 경로도 `http(s)://` URL도 아닌 경우
    /// - ttl이 0인 경우
    pub fn build(self) -> Result<HttpRequest<T, R>, BrightError> {
        validate_url(&self.url)?;
        if self.command.ttl().is_zero() {
            return Err(ValidationError::InvalidValue {
                field: "ttl".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        Ok(HttpRequest {
            command: self.command,
            url: self.url,
            method: self.method,
            params: self.params,
        })
    }
}

fn validate_url(url: &str) -> Result<(), ValidationError> {
    let invalid = |reason: &str| ValidationError::InvalidUrl {
        url: url.to_owned(),
        reason: reason.to_owned(),
    };

    if url.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if url.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain whitespace"));
    }
    if url.starts_with('/') {
        return Ok(());
    }
    let host = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    match host {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(invalid("must be a path starting with '/' or an http(s) url")),
    }
}
