#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`request`]: 요청 커맨드 (`HttpRequest`, `HttpRequestBuilder`, `HttpMethod`)
//! - [`body`]: 요청 본문 (`IntoRequestBody`, `Json`, `FormData`)
//! - [`config`]: dispatcher 설정 (`HttpDispatcherConfig`, builder)
//! - [`rate_limiter`]: 슬라이딩 윈도우 레이트 리미터 (`RateLimiter`)
//! - [`dispatcher`]: 전송 구현 (`HttpCommandDispatcher`)
//!
//! # Architecture
//!
//! ```text
//! HttpRequest --execute--> HttpCommandDispatcher
//!                               |
//!                          RetryStrategy.acquire()
//!                               |
//!                          RateLimiter.acquire()
//!                               |
//!                          reqwest::Client --> Bright REST API
//! ```

pub mod body;
pub mod config;
pub mod dispatcher;
pub mod rate_limiter;
pub mod request;

pub use body::{FormData, FormPart, IntoRequestBody, Json};
pub use config::{HttpDispatcherConfig, HttpDispatcherConfigBuilder, RateConfig};
pub use dispatcher::{CORRELATION_ID_HEADER, HttpCommandDispatcher};
pub use rate_limiter::{RateLimitInfo, RateLimiter};
pub use request::{HttpMethod, HttpRequest, HttpRequestBuilder};
