//! Dispatcher trait: 메시지 전송 확장 포인트 정의
//!
//! 전송 수단(HTTP, 메시지 버스)은 이 trait들을 구현하고,
//! 메시지 타입은 이 trait들만 알고 있습니다.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::Serialize;

use crate::error::BrightError;
use crate::message::{AsCommand, Command, Envelope, Event};
use crate::types::Issue;

/// 커맨드를 실행하는 trait
///
/// 응답을 기대하지 않는 커맨드는 `Ok(None)`으로 완료됩니다.
pub trait CommandDispatcher<C: AsCommand>: Send + Sync {
    /// 커맨드를 실행하고 응답을 돌려줍니다.
    fn execute(
        &self,
        command: C,
    ) -> impl Future<Output = Result<Option<C::Reply>, BrightError>> + Send;
}

/// 이벤트를 발행하는 trait
pub trait EventDispatcher: Send + Sync {
    /// 이벤트를 발행합니다.
    fn publish<T>(&self, event: Event<T>) -> impl Future<Output = Result<(), BrightError>> + Send
    where
        T: Serialize + Send + Sync + 'static;
}

/// 버스에서 메시지를 처리하는 핸들러
///
/// 이벤트 핸들러는 `Ok(None)`을, 커맨드 핸들러는 응답 JSON을 돌려줍니다.
pub trait EventHandler: Send + Sync {
    /// 봉투 하나를 처리합니다.
    fn handle(
        &self,
        envelope: Envelope,
    ) -> BoxFuture<'_, Result<Option<serde_json::Value>, BrightError>>;
}

/// 클로저 기반 핸들러
pub struct FnHandler<F> {
    f: F,
}

/// 클로저를 [`EventHandler`]로 감쌉니다.
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(Envelope) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<serde_json::Value>, BrightError>> + Send + 'static,
{
    FnHandler { f }
}

impl<F, Fut> EventHandler for FnHandler<F>
where
    F: Fn(Envelope) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<serde_json::Value>, BrightError>> + Send + 'static,
{
    fn handle(
        &self,
        envelope: Envelope,
    ) -> BoxFuture<'_, Result<Option<serde_json::Value>, BrightError>> {
        Box::pin((self.f)(envelope))
    }
}

/// 메시지 버스: 이벤트 발행, 커맨드 실행, 핸들러 등록을 함께 제공합니다.
///
/// 핸들러는 부트스트랩 시점에 메시지 이름으로 명시적으로 등록합니다.
pub trait EventBus:
    EventDispatcher + CommandDispatcher<Command<serde_json::Value, serde_json::Value>>
{
    /// 메시지 이름에 핸들러를 등록합니다.
    fn register(
        &self,
        message_type: &str,
        handler: Arc<dyn EventHandler>,
    ) -> impl Future<Output = Result<(), BrightError>> + Send;

    /// 메시지 이름에 등록된 핸들러를 모두 제거하고 제거된 개수를 돌려줍니다.
    fn unregister(&self, message_type: &str) -> impl Future<Output = usize> + Send;
}

/// 이슈 목록을 제공하는 trait (리포터 입력)
pub trait IssueSource: Send + Sync {
    /// 이슈 목록을 가져옵니다.
    fn issues(&self) -> impl Future<Output = Result<Vec<Issue>, BrightError>> + Send;
}

impl IssueSource for Vec<Issue> {
    async fn issues(&self) -> Result<Vec<Issue>, BrightError> {
        Ok(self.clone())
    }
}
