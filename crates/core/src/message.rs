//! 메시지 모델: 커맨드와 이벤트의 공통 봉투
//!
//! 모든 메시지는 [`MessageMetadata`]를 가지며, 생성 후에는 변경되지 않습니다.
//! [`Command`]는 최대 하나의 응답을 기대하는 요청이고,
//! [`Event`]는 응답 없는 알림입니다.
//!
//! # 사용 예시
//! ```ignore
//! use std::time::Duration;
//! use bright_core::message::Command;
//!
//! let command: Command<_, serde_json::Value> = Command::new(serde_json::json!({"id": 1}))
//!     .with_type("ScanStarted")
//!     .with_ttl(Duration::from_secs(5));
//! let reply = command.execute(&bus).await?;
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::dispatcher::{CommandDispatcher, EventDispatcher};
use crate::error::BrightError;

/// 커맨드 기본 TTL (밀리초)
pub const DEFAULT_TTL_MS: u64 = 10_000;

/// 메시지 메타데이터: 타입 태그, 상관관계 ID, 생성 시각
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageMetadata {
    message_type: String,
    correlation_id: String,
    created_at: DateTime<Utc>,
}

impl MessageMetadata {
    /// 새 UUID v4 상관관계 ID와 현재 시각으로 메타데이터를 생성합니다.
    pub fn new(message_type: impl Into<String>) -> Self {
        Self {
            message_type: message_type.into(),
            correlation_id: uuid::Uuid::new_v4().to_string(),
            created_at: Utc::now(),
        }
    }

    /// 메시지 타입명 (라우팅과 로깅에 사용)
    pub fn message_type(&self) -> &str {
        &self.message_type
    }

    /// 상관관계 ID
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    /// 생성 시각
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// 생성 시각을 ISO-8601 (밀리초, `Z` 접미사) 문자열로 반환합니다.
    pub fn created_at_iso(&self) -> String {
        self.created_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl fmt::Display for MessageMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] type={} correlation={}",
            self.created_at_iso(),
            self.message_type,
            self.correlation_id,
        )
    }
}

/// 페이로드 타입에서 기본 메시지 타입명을 계산합니다.
///
/// 경로와 제네릭 인자를 제외한 마지막 세그먼트를 사용합니다
/// (`bright_scan::commands::StopScan` → `StopScan`).
pub fn default_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_owned()
}

/// 최대 하나의 응답을 기대하는 요청 메시지
///
/// `R`은 응답 타입입니다. `expect_reply`가 `false`이면 dispatcher는 응답
/// 본문을 무시하고 `None`을 돌려줍니다.
pub struct Command<T, R> {
    payload: T,
    metadata: MessageMetadata,
    expect_reply: bool,
    ttl: Duration,
    _reply: PhantomData<fn() -> R>,
}

impl<T, R> Command<T, R> {
    /// 기본값(`expect_reply = true`, `ttl = 10s`)으로 커맨드를 생성합니다.
    pub fn new(payload: T) -> Self {
        Self {
            payload,
            metadata: MessageMetadata::new(default_type_name::<T>()),
            expect_reply: true,
            ttl: Duration::from_millis(DEFAULT_TTL_MS),
            _reply: PhantomData,
        }
    }

    /// 메시지 타입명을 지정합니다.
    pub fn with_type(mut self, message_type: impl Into<String>) -> Self {
        self.metadata.message_type = message_type.into();
        self
    }

    /// 상관관계 ID를 지정합니다 (기존 흐름에 연결할 때).
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.metadata.correlation_id = correlation_id.into();
        self
    }

    /// 생성 시각을 지정합니다.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.metadata.created_at = created_at;
        self
    }

    /// 응답 기대 여부를 지정합니다.
    pub fn with_expect_reply(mut self, expect_reply: bool) -> Self {
        self.expect_reply = expect_reply;
        self
    }

    /// TTL을 지정합니다. HTTP 전송 시 요청 타임아웃으로 사용됩니다.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    pub fn metadata(&self) -> &MessageMetadata {
        &self.metadata
    }

    pub fn message_type(&self) -> &str {
        self.metadata.message_type()
    }

    pub fn correlation_id(&self) -> &str {
        self.metadata.correlation_id()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.metadata.created_at()
    }

    pub fn expect_reply(&self) -> bool {
        self.expect_reply
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 페이로드와 메타데이터를 분리합니다.
    pub fn into_parts(self) -> (T, MessageMetadata) {
        (self.payload, self.metadata)
    }

    /// dispatcher를 통해 커맨드를 실행합니다.
    pub async fn execute<D>(self, dispatcher: &D) -> Result<Option<R>, BrightError>
    where
        D: CommandDispatcher<Self>,
        T: Send,
    {
        dispatcher.execute(self).await
    }
}

impl<T: Clone, R> Clone for Command<T, R> {
    fn clone(&self) -> Self {
        Self {
            payload: self.payload.clone(),
            metadata: self.metadata.clone(),
            expect_reply: self.expect_reply,
            ttl: self.ttl,
            _reply: PhantomData,
        }
    }
}

impl<T: fmt::Debug, R> fmt::Debug for Command<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("payload", &self.payload)
            .field("metadata", &self.metadata)
            .field("expect_reply", &self.expect_reply)
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// 커맨드로 취급할 수 있는 메시지 (`Command` 자신 또는 이를 감싼 타입)
pub trait AsCommand: Send {
    /// 페이로드 타입
    type Payload;
    /// 응답 타입
    type Reply;

    /// 내부 커맨드를 참조합니다.
    fn as_command(&self) -> &Command<Self::Payload, Self::Reply>;
}

impl<T: Send, R> AsCommand for Command<T, R> {
    type Payload = T;
    type Reply = R;

    fn as_command(&self) -> &Command<T, R> {
        self
    }
}

/// 응답 없는 알림 메시지
#[derive(Debug, Clone)]
pub struct Event<T> {
    payload: T,
    metadata: MessageMetadata,
}

impl<T> Event<T> {
    /// 새로운 상관관계 ID로 이벤트를 생성합니다.
    pub fn new(payload: T) -> Self {
        Self {
            payload,
            metadata: MessageMetadata::new(default_type_name::<T>()),
        }
    }

    /// 메시지 타입명을 지정합니다.
    pub fn with_type(mut self, message_type: impl Into<String>) -> Self {
        self.metadata.message_type = message_type.into();
        self
    }

    /// 기존 흐름의 상관관계 ID를 이어받습니다.
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.metadata.correlation_id = correlation_id.into();
        self
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    pub fn metadata(&self) -> &MessageMetadata {
        &self.metadata
    }

    pub fn message_type(&self) -> &str {
        self.metadata.message_type()
    }

    pub fn correlation_id(&self) -> &str {
        self.metadata.correlation_id()
    }

    pub fn into_parts(self) -> (T, MessageMetadata) {
        (self.payload, self.metadata)
    }

    /// dispatcher를 통해 이벤트를 발행합니다.
    pub async fn publish<D>(self, dispatcher: &D) -> Result<(), BrightError>
    where
        D: EventDispatcher,
        T: Serialize + Send + Sync + 'static,
    {
        dispatcher.publish(self).await
    }
}

/// 버스 위를 흐르는 직렬화된 메시지
///
/// 페이로드는 JSON으로 직렬화되어 있어 타입과 무관하게 라우팅할 수 있습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub message_type: String,
    pub correlation_id: String,
    pub created_at: DateTime<Utc>,
    pub payload: serde_json::Value,
}

impl Envelope {
    /// 페이로드를 직렬화하여 봉투를 만듭니다.
    pub fn seal<T: Serialize>(payload: &T, metadata: &MessageMetadata) -> Result<Self, BrightError> {
        Ok(Self {
            message_type: metadata.message_type().to_owned(),
            correlation_id: metadata.correlation_id().to_owned(),
            created_at: metadata.created_at(),
            payload: serde_json::to_value(payload)?,
        })
    }

    /// 페이로드를 원하는 타입으로 역직렬화합니다.
    pub fn open<T: serde::de::DeserializeOwned>(&self) -> Result<T, BrightError> {
        Ok(serde_json::from_value(self.payload.clone())?)
    }
}
