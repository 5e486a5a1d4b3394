//! 재시도 전략: 실패할 수 있는 비동기 작업을 감싸는 정책
//!
//! dispatcher는 재시도 횟수나 백오프를 알지 못하고 [`RetryStrategy::acquire`]에
//! 작업을 넘기기만 합니다. 어떤 정책을 쓸지는 조립 루트(CLI)가 설정으로 결정합니다.
//!
//! 재시도 여부는 [`BrightError::is_retryable`]로 판단합니다.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::config::RetryConfig;
use crate::error::{BrightError, ConfigError};
use crate::metrics as m;

/// 실패할 수 있는 비동기 작업을 실행하고 필요하면 재시도하는 trait
pub trait RetryStrategy: Send + Sync {
    /// 작업을 실행합니다. 재시도가 모두 실패하면 마지막 에러를 돌려줍니다.
    fn acquire<T, F, Fut>(&self, op: F) -> impl Future<Output = Result<T, BrightError>> + Send
    where
        T: Send,
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, BrightError>> + Send;
}

/// 재시도하지 않는 정책
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRetry;

impl RetryStrategy for NoRetry {
    async fn acquire<T, F, Fut>(&self, mut op: F) -> Result<T, BrightError>
    where
        T: Send,
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, BrightError>> + Send,
    {
        op().await
    }
}

/// 고정 간격 재시도
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    /// 첫 시도 이후 재시도 최대 횟수
    pub max_retries: u32,
    /// 재시도 간격
    pub delay: Duration,
}

impl RetryStrategy for FixedDelay {
    async fn acquire<T, F, Fut>(&self, op: F) -> Result<T, BrightError>
    where
        T: Send,
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, BrightError>> + Send,
    {
        let delay = self.delay;
        retry_loop(self.max_retries, move |_| delay, op).await
    }
}

/// 지수 백오프 재시도 (`base * 2^(n-1)`, 상한 `max_delay`)
#[derive(Debug, Clone, Copy)]
pub struct ExponentialBackoff {
    /// 첫 시도 이후 재시도 최대 횟수
    pub max_retries: u32,
    /// 첫 재시도 대기 시간
    pub base_delay: Duration,
    /// 대기 시간 상한
    pub max_delay: Duration,
}

impl ExponentialBackoff {
    /// n번째 재시도(1부터) 전의 대기 시간
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exp = retry.saturating_sub(1).min(31);
        self.base_delay
            .checked_mul(1u32 << exp)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryStrategy for ExponentialBackoff {
    async fn acquire<T, F, Fut>(&self, op: F) -> Result<T, BrightError>
    where
        T: Send,
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, BrightError>> + Send,
    {
        let policy = *self;
        retry_loop(self.max_retries, move |retry| policy.delay_for(retry), op).await
    }
}

/// 설정에서 선택되는 정책
#[derive(Debug, Clone, Copy)]
pub enum RetryPolicy {
    None(NoRetry),
    Fixed(FixedDelay),
    Exponential(ExponentialBackoff),
}

impl RetryPolicy {
    /// `[retry]` 설정 섹션에서 정책을 생성합니다.
    pub fn from_config(config: &RetryConfig) -> Result<Self, BrightError> {
        match config.strategy.as_str() {
            "none" => Ok(Self::None(NoRetry)),
            "fixed" => Ok(Self::Fixed(FixedDelay {
                max_retries: config.max_retries,
                delay: Duration::from_millis(config.base_delay_ms),
            })),
            "exponential" => Ok(Self::Exponential(ExponentialBackoff {
                max_retries: config.max_retries,
                base_delay: Duration::from_millis(config.base_delay_ms),
                max_delay: Duration::from_millis(config.max_delay_ms),
            })),
            other => Err(ConfigError::InvalidValue {
                field: "retry.strategy".to_owned(),
                reason: format!("unknown strategy '{other}', expected: none, fixed, exponential"),
            }
            .into()),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::Exponential(ExponentialBackoff::default())
    }
}

impl RetryStrategy for RetryPolicy {
    async fn acquire<T, F, Fut>(&self, op: F) -> Result<T, BrightError>
    where
        T: Send,
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, BrightError>> + Send,
    {
        match self {
            Self::None(p) => p.acquire(op).await,
            Self::Fixed(p) => p.acquire(op).await,
            Self::Exponential(p) => p.acquire(op).await,
        }
    }
}

async fn retry_loop<T, F, Fut, D>(max_retries: u32, delay_for: D, mut op: F) -> Result<T, BrightError>
where
    T: Send,
    F: FnMut() -> Fut + Send,
    Fut: Future<Output = Result<T, BrightError>> + Send,
    D: Fn(u32) -> Duration + Send,
{
    let mut retry = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if retry < max_retries && e.is_retryable() => {
                retry += 1;
                let backoff = delay_for(retry);
                warn!(
                    attempt = retry,
                    backoff_ms = u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX),
                    error = %e,
                    "retrying failed operation"
                );
                metrics::counter!(m::RETRY_ATTEMPTS_TOTAL).increment(1);
                tokio::time::sleep(backoff).await;
            }
            Err(e) => return Err(e),
        }
    }
}
