//! HTTP 커맨드 dispatcher
//!
//! [`HttpRequest`]를 Bright REST API 호출로 바꿉니다.
//!
//! # 요청 처리 순서
//! 1. [`RetryStrategy::acquire`]가 한 번의 시도를 감쌉니다.
//! 2. 시도마다 [`RateLimiter`]에서 슬롯을 얻습니다.
//! 3. 인증/상관관계/날짜 헤더를 붙이고 커맨드 ttl을 타임아웃으로 전송합니다.
//! 4. `expect_reply == false`면 본문을 끝까지 소비하고 `None`,
//!    아니면 JSON 본문을 `R`로 역직렬화합니다 (빈 본문은 `null`).

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::StreamExt;
use reqwest::header::{AUTHORIZATION, DATE};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use bright_core::config::Configuration;
use bright_core::credentials::Credentials;
use bright_core::dispatcher::CommandDispatcher;
use bright_core::error::{BrightError, CODE_BAD_REQUEST, CODE_BAD_RESPONSE, DispatchError};
use bright_core::metrics as m;
use bright_core::retry::{RetryPolicy, RetryStrategy};

use crate::body::IntoRequestBody;
use crate::config::HttpDispatcherConfig;
use crate::rate_limiter::RateLimiter;
use crate::request::{HttpMethod, HttpRequest};

/// 상관관계 ID 헤더
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// 에러 메시지로 옮길 응답 본문의 최대 길이
const MAX_ERROR_BODY_CHARS: usize = 512;

/// keep-alive 사용 시 TCP keepalive 간격
const TCP_KEEPALIVE: Duration = Duration::from_secs(60);

/// Bright REST API로 커맨드를 전송하는 dispatcher
///
/// 연결 풀(`reqwest::Client`)과 레이트 리미터는 생성 시 한 번 만들어지고
/// 복제본끼리 공유됩니다.
#[derive(Debug, Clone)]
pub struct HttpCommandDispatcher<S = RetryPolicy> {
    client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
    limiter: Arc<RateLimiter>,
    retry: S,
}

impl<S: RetryStrategy> HttpCommandDispatcher<S> {
    /// 설정과 재시도 정책으로 dispatcher를 생성합니다.
    pub fn new(config: HttpDispatcherConfig, retry: S) -> Result<Self, BrightError> {
        config.validate()?;
        let credentials = config.credentials.ok_or_else(|| {
            BrightError::illegal_operation("HttpCommandDispatcher", "please provide credentials")
        })?;

        let builder = reqwest::Client::builder().timeout(config.timeout);
        let builder = if config.keep_alive {
            builder
                .pool_max_idle_per_host(config.max_sockets)
                .tcp_keepalive(TCP_KEEPALIVE)
        } else {
            builder.pool_max_idle_per_host(0)
        };
        let client = builder.build().map_err(|e| {
            BrightError::illegal_operation(
                "HttpCommandDispatcher",
                format!("failed to build http client: {e}"),
            )
        })?;

        let base_url = config.base_url.trim_end_matches('/').to_owned();
        info!(
            base_url = base_url.as_str(),
            rate_limit = config.rate.limit,
            rate_window_ms = u64::try_from(config.rate.window.as_millis()).unwrap_or(u64::MAX),
            keep_alive = config.keep_alive,
            "http dispatcher created"
        );

        Ok(Self {
            client,
            base_url,
            credentials,
            limiter: Arc::new(RateLimiter::new(config.rate.limit, config.rate.window)),
            retry,
        })
    }

    /// 런타임 설정에서 dispatcher를 생성합니다.
    ///
    /// # Errors
    /// 자격 증명이 로드되지 않았으면 [`BrightError::IllegalOperation`]
    pub fn from_configuration(configuration: &Configuration, retry: S) -> Result<Self, BrightError> {
        let credentials = configuration.credentials()?.clone();
        Self::new(
            HttpDispatcherConfig::from_api(configuration.api(), credentials),
            retry,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// 경로를 기본 주소에 붙입니다. 절대 URL은 그대로 사용합니다.
    fn resolve_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_owned()
        } else {
            format!("{}{}", self.base_url, url)
        }
    }

    async fn send_once<T, R>(&self, request: &HttpRequest<T, R>) -> Result<Option<R>, BrightError>
    where
        T: IntoRequestBody,
        R: DeserializeOwned,
    {
        self.limiter.acquire().await;

        let method = request.method();
        let url = self.resolve_url(request.url());
        let command = request.command();
        let ttl = command.ttl();

        let mut builder = self
            .client
            .request(method.into(), &url)
            .timeout(ttl)
            .header(
                AUTHORIZATION,
                format!("api-key {}", self.credentials.token()),
            )
            .header(CORRELATION_ID_HEADER, command.correlation_id())
            .header(DATE, command.metadata().created_at_iso());
        if let Some(params) = request.params() {
            builder = builder.query(params);
        }
        let builder = command.payload().apply(builder)?;

        debug!(
            method = method.as_str(),
            url = url.as_str(),
            correlation_id = command.correlation_id(),
            "sending request"
        );

        let started = Instant::now();
        let response = builder.send().await;
        metrics::histogram!(m::HTTP_REQUEST_DURATION_SECONDS)
            .record(started.elapsed().as_secs_f64());

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                let err = send_error(method, &url, ttl, &e);
                record_result(method, &err);
                return Err(err.into());
            }
        };

        let status = response.status();
        if !status.is_success() {
            let reason = status
                .canonical_reason()
                .map(str::to_owned)
                .unwrap_or_else(|| format!("request failed with status code {}", status.as_u16()));
            // 스트림 응답은 본문을 메시지로 쓰지 않습니다.
            let message = if command.expect_reply() {
                let text = response.text().await.unwrap_or_default();
                extract_message(&text).unwrap_or(reason)
            } else {
                reason
            };
            let err = DispatchError::Status {
                method: method.as_str().to_owned(),
                url: url.clone(),
                status: status.as_u16(),
                code: if status.is_server_error() {
                    CODE_BAD_RESPONSE.to_owned()
                } else {
                    CODE_BAD_REQUEST.to_owned()
                },
                message,
            };
            warn!(
                method = method.as_str(),
                url = url.as_str(),
                status = status.as_u16(),
                correlation_id = command.correlation_id(),
                error = %err,
                "request failed"
            );
            record_result(method, &err);
            return Err(err.into());
        }

        if !command.expect_reply() {
            let mut stream = response.bytes_stream();
            while let Some(chunk) = stream.next().await {
                chunk.map_err(|e| read_error(method, &url, ttl, &e))?;
            }
            metrics::counter!(
                m::HTTP_REQUESTS_TOTAL,
                m::LABEL_METHOD => method.as_str(),
                m::LABEL_RESULT => "success"
            )
            .increment(1);
            return Ok(None);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| read_error(method, &url, ttl, &e))?;
        let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &body
        };
        let reply = serde_json::from_slice::<R>(body).map_err(|e| DispatchError::Body {
            method: method.as_str().to_owned(),
            url: url.clone(),
            message: e.to_string(),
        })?;

        metrics::counter!(
            m::HTTP_REQUESTS_TOTAL,
            m::LABEL_METHOD => method.as_str(),
            m::LABEL_RESULT => "success"
        )
        .increment(1);
        Ok(Some(reply))
    }
}

impl<T, R, S> CommandDispatcher<HttpRequest<T, R>> for HttpCommandDispatcher<S>
where
    T: IntoRequestBody,
    R: DeserializeOwned + Send,
    S: RetryStrategy,
{
    async fn execute(&self, request: HttpRequest<T, R>) -> Result<Option<R>, BrightError> {
        let request = &request;
        self.retry.acquire(|| self.send_once(request)).await
    }
}

fn send_error(method: HttpMethod, url: &str, ttl: Duration, e: &reqwest::Error) -> DispatchError {
    if e.is_timeout() {
        DispatchError::Timeout {
            method: method.as_str().to_owned(),
            url: url.to_owned(),
            ttl_ms: u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX),
        }
    } else {
        DispatchError::Transport {
            method: method.as_str().to_owned(),
            url: url.to_owned(),
            message: e.to_string(),
        }
    }
}

fn read_error(method: HttpMethod, url: &str, ttl: Duration, e: &reqwest::Error) -> DispatchError {
    if e.is_timeout() {
        send_error(method, url, ttl, e)
    } else {
        DispatchError::Body {
            method: method.as_str().to_owned(),
            url: url.to_owned(),
            message: e.to_string(),
        }
    }
}

fn record_result(method: HttpMethod, err: &DispatchError) {
    let result = if err.is_timeout() { "timeout" } else { "failure" };
    metrics::counter!(
        m::HTTP_REQUESTS_TOTAL,
        m::LABEL_METHOD => method.as_str(),
        m::LABEL_RESULT => result
    )
    .increment(1);
}

/// 에러 응답 본문에서 사람이 읽을 메시지를 꺼냅니다.
///
/// JSON이면 `message` 또는 `error` 필드를, 아니면 본문 텍스트를 사용합니다.
fn extract_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(serde_json::Value::String(message)) = map.get(key) {
                return Some(message.clone());
            }
        }
    }

    Some(body.chars().take(MAX_ERROR_BODY_CHARS).collect())
}
