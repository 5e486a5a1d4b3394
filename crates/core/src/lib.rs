#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`error`]: 에러 타입 (`BrightError`, `DispatchError`, ...)
//! - [`message`]: 메시지 모델 (`MessageMetadata`, `Command`, `Event`, `Envelope`)
//! - [`dispatcher`]: 전송 확장 포인트 (`CommandDispatcher`, `EventDispatcher`, `EventBus`)
//! - [`credentials`]: API 키 검증과 제공자 체인
//! - [`config`]: 설정 파일(`BrightConfig`)과 런타임 설정(`Configuration`)
//! - [`retry`]: 재시도 정책 (`RetryStrategy`, `RetryPolicy`)
//! - [`types`]: 이슈와 심각도 모델
//! - [`metrics`]: 메트릭 이름 상수

pub mod config;
pub mod credentials;
pub mod dispatcher;
pub mod error;
pub mod message;
pub mod metrics;
pub mod retry;
pub mod types;

// --- 주요 타입 re-export ---
// 각 모듈의 핵심 타입을 크레이트 루트에서 바로 사용할 수 있도록 합니다.

// 에러
pub use error::{
    BrightError, ConfigError, CredentialsError, DispatchError, ValidationError,
};

// 설정
pub use config::{ApiConfig, BrightConfig, BusConfig, Configuration, GeneralConfig, RetryConfig};

// 자격 증명
pub use credentials::{
    CredentialProvider, Credentials, EnvCredentialProvider, StaticCredentialProvider,
};

// 메시지
pub use message::{AsCommand, Command, Envelope, Event, MessageMetadata};

// dispatcher trait
pub use dispatcher::{
    CommandDispatcher, EventBus, EventDispatcher, EventHandler, IssueSource, handler_fn,
};

// 재시도
pub use retry::{ExponentialBackoff, FixedDelay, NoRetry, RetryPolicy, RetryStrategy};

// 도메인 타입
pub use types::{Issue, IssuesGroup, Request, Severity, severity_comparator, severity_to_number};
