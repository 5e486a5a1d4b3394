//! 프로세스 내 이벤트 버스
//!
//! 메시지 이름별로 핸들러 목록을 보관합니다. 페이로드는 [`Envelope`]로
//! 직렬화된 뒤 전달되므로 핸들러는 브로커를 거친 메시지와 같은 형태를 받습니다.
//!
//! - 이벤트: 등록 순서대로 모든 핸들러에 전달, 핸들러 실패는 기록만 합니다.
//! - 커맨드: 처음 등록된 핸들러 하나에 전달, 응답은 `ttl` 안에 와야 합니다.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use bright_core::config::BusConfig;
use bright_core::dispatcher::{CommandDispatcher, EventBus, EventDispatcher, EventHandler};
use bright_core::error::{BrightError, DispatchError};
use bright_core::message::{Command, Envelope, Event};
use bright_core::metrics as m;

use crate::error::BusError;

/// 커맨드 에러에 표시되는 메서드 이름
const BUS_METHOD: &str = "COMMAND";

/// 프로세스 내 이벤트 버스
pub struct InMemoryEventBus {
    exchange: String,
    handlers: RwLock<HashMap<String, Vec<Arc<dyn EventHandler>>>>,
}

impl InMemoryEventBus {
    /// 익스체인지 이름으로 버스를 생성합니다.
    pub fn new(exchange: impl Into<String>) -> Self {
        Self {
            exchange: exchange.into(),
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// 설정에서 버스를 생성합니다.
    ///
    /// 브로커 주소가 있어도 메시지는 프로세스 안에서만 전달됩니다.
    pub fn from_config(config: &BusConfig) -> Result<Self, BusError> {
        if config.exchange.trim().is_empty() {
            return Err(BusError::Config {
                field: "bus.exchange".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }
        if let Some(url) = &config.url {
            info!(
                url = url.as_str(),
                exchange = config.exchange.as_str(),
                "broker url configured, messages stay in-process"
            );
        }
        Ok(Self::new(config.exchange.clone()))
    }

    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    /// 메시지 이름에 등록된 핸들러 수
    pub async fn handler_count(&self, message_type: &str) -> usize {
        self.handlers
            .read()
            .await
            .get(message_type)
            .map_or(0, Vec::len)
    }

    async fn snapshot(&self, message_type: &str) -> Vec<Arc<dyn EventHandler>> {
        self.handlers
            .read()
            .await
            .get(message_type)
            .cloned()
            .unwrap_or_default()
    }

    async fn first_handler(&self, message_type: &str) -> Option<Arc<dyn EventHandler>> {
        self.handlers
            .read()
            .await
            .get(message_type)
            .and_then(|handlers| handlers.first().cloned())
    }

    fn command_url(&self, message_type: &str) -> String {
        format!("bus://{}/{}", self.exchange, message_type)
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new(BusConfig::default().exchange)
    }
}

impl std::fmt::Debug for InMemoryEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryEventBus")
            .field("exchange", &self.exchange)
            .finish_non_exhaustive()
    }
}

impl EventDispatcher for InMemoryEventBus {
    async fn publish<T>(&self, event: Event<T>) -> Result<(), BrightError>
    where
        T: Serialize + Send + Sync + 'static,
    {
        let (payload, metadata) = event.into_parts();
        let envelope = Envelope::seal(&payload, &metadata)?;
        let message_type = envelope.message_type.clone();

        let handlers = self.snapshot(&message_type).await;
        if handlers.is_empty() {
            debug!(
                message_type = message_type.as_str(),
                "event has no subscribers"
            );
        }

        for handler in handlers {
            if let Err(e) = handler.handle(envelope.clone()).await {
                warn!(
                    message_type = message_type.as_str(),
                    correlation_id = envelope.correlation_id.as_str(),
                    error = %e,
                    "event handler failed"
                );
                metrics::counter!(
                    m::BUS_HANDLER_FAILURES_TOTAL,
                    m::LABEL_MESSAGE_TYPE => message_type.clone()
                )
                .increment(1);
            }
        }

        metrics::counter!(
            m::BUS_EVENTS_PUBLISHED_TOTAL,
            m::LABEL_MESSAGE_TYPE => message_type
        )
        .increment(1);
        Ok(())
    }
}

impl<T, R> CommandDispatcher<Command<T, R>> for InMemoryEventBus
where
    T: Serialize + Send + Sync,
    R: DeserializeOwned + Send,
{
    async fn execute(&self, command: Command<T, R>) -> Result<Option<R>, BrightError> {
        let expect_reply = command.expect_reply();
        let ttl = command.ttl();
        let (payload, metadata) = command.into_parts();
        let envelope = Envelope::seal(&payload, &metadata)?;
        let message_type = envelope.message_type.clone();

        let Some(handler) = self.first_handler(&message_type).await else {
            record_command(&message_type, "no_handler");
            return Err(BusError::NoHandler(message_type).into());
        };

        debug!(
            message_type = message_type.as_str(),
            correlation_id = envelope.correlation_id.as_str(),
            expect_reply,
            "dispatching command"
        );

        if !expect_reply {
            if let Err(e) = handler.handle(envelope).await {
                warn!(
                    message_type = message_type.as_str(),
                    error = %e,
                    "command handler failed, no reply expected"
                );
                metrics::counter!(
                    m::BUS_HANDLER_FAILURES_TOTAL,
                    m::LABEL_MESSAGE_TYPE => message_type.clone()
                )
                .increment(1);
            }
            record_command(&message_type, "success");
            return Ok(None);
        }

        let reply = match tokio::time::timeout(ttl, handler.handle(envelope)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                metrics::counter!(
                    m::BUS_HANDLER_FAILURES_TOTAL,
                    m::LABEL_MESSAGE_TYPE => message_type.clone()
                )
                .increment(1);
                record_command(&message_type, "failure");
                return Err(e);
            }
            Err(_) => {
                warn!(
                    message_type = message_type.as_str(),
                    ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX),
                    "command timed out"
                );
                record_command(&message_type, "timeout");
                return Err(DispatchError::Timeout {
                    method: BUS_METHOD.to_owned(),
                    url: self.command_url(&message_type),
                    ttl_ms: u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX),
                }
                .into());
            }
        };

        let reply = reply.unwrap_or(serde_json::Value::Null);
        let parsed = serde_json::from_value(reply).map_err(|e| DispatchError::Body {
            method: BUS_METHOD.to_owned(),
            url: self.command_url(&message_type),
            message: e.to_string(),
        })?;

        record_command(&message_type, "success");
        Ok(Some(parsed))
    }
}

impl EventBus for InMemoryEventBus {
    async fn register(
        &self,
        message_type: &str,
        handler: Arc<dyn EventHandler>,
    ) -> Result<(), BrightError> {
        if message_type.trim().is_empty() {
            return Err(BusError::EmptyMessageType.into());
        }
        let mut handlers = self.handlers.write().await;
        let entry = handlers.entry(message_type.to_owned()).or_default();
        entry.push(handler);
        debug!(
            message_type,
            handlers = entry.len(),
            "handler registered"
        );
        Ok(())
    }

    async fn unregister(&self, message_type: &str) -> usize {
        let removed = self
            .handlers
            .write()
            .await
            .remove(message_type)
            .map_or(0, |handlers| handlers.len());
        debug!(message_type, removed, "handlers unregistered");
        removed
    }
}

fn record_command(message_type: &str, result: &'static str) {
    metrics::counter!(
        m::BUS_COMMANDS_TOTAL,
        m::LABEL_MESSAGE_TYPE => message_type.to_owned(),
        m::LABEL_RESULT => result
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use bright_core::dispatcher::handler_fn;

    #[tokio::test]
    async fn register_and_unregister() {
        let bus = InMemoryEventBus::default();
        let handler: Arc<dyn EventHandler> = Arc::new(handler_fn(|_e: Envelope| async { Ok(None) }));

        bus.register("ScanStarted", Arc::clone(&handler)).await.unwrap();
        bus.register("ScanStarted", handler).await.unwrap();
        assert_eq!(bus.handler_count("ScanStarted").await, 2);

        assert_eq!(bus.unregister("ScanStarted").await, 2);
        assert_eq!(bus.handler_count("ScanStarted").await, 0);
        assert_eq!(bus.unregister("ScanStarted").await, 0);
    }

    #[tokio::test]
    async fn register_rejects_blank_name() {
        let bus = InMemoryEventBus::default();
        let handler: Arc<dyn EventHandler> = Arc::new(handler_fn(|_e: Envelope| async { Ok(None) }));
        let err = bus.register("  ", handler).await.unwrap_err();
        assert!(matches!(err, BrightError::Validation(_)));
    }

    #[test]
    fn from_config_uses_exchange() {
        let bus = InMemoryEventBus::from_config(&BusConfig {
            url: Some("amqp://localhost:5672".to_owned()),
            exchange: "Scans".to_owned(),
        })
        .unwrap();
        assert_eq!(bus.exchange(), "Scans");
    }

    #[test]
    fn from_config_rejects_empty_exchange() {
        let err = InMemoryEventBus::from_config(&BusConfig {
            url: None,
            exchange: String::new(),
        })
        .unwrap_err();
        assert!(matches!(err, BusError::Config { .. }));
    }

    #[test]
    fn default_exchange_name() {
        assert_eq!(InMemoryEventBus::default().exchange(), "EventBus");
    }
}
