//! REST 스캔 API 클라이언트
//!
//! [`RestScans`]는 공유 dispatcher 위에서 스캔 커맨드를 실행합니다.
//! dispatcher는 [`ScanDispatcher`]를 만족하면 무엇이든 될 수 있으며,
//! 실제 환경에서는 `HttpCommandDispatcher`를 씁니다.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use bright_core::dispatcher::CommandDispatcher;
use bright_core::error::BrightError;
use bright_core::types::Issue;
use bright_http::{FormData, HttpRequest, Json};

use crate::commands;
use crate::error::ScanError;
use crate::models::{Created, HarFile, ScanConfig, ScanState};
use crate::scan::Scan;

/// 스캔 API가 필요로 하는 모든 요청 타입을 실행할 수 있는 dispatcher
pub trait ScanDispatcher:
    CommandDispatcher<HttpRequest<Json<ScanConfig>, Created>>
    + CommandDispatcher<HttpRequest<(), ScanState>>
    + CommandDispatcher<HttpRequest<(), Vec<Issue>>>
    + CommandDispatcher<HttpRequest<(), Value>>
    + CommandDispatcher<HttpRequest<FormData, Created>>
{
}

impl<D> ScanDispatcher for D where
    D: CommandDispatcher<HttpRequest<Json<ScanConfig>, Created>>
        + CommandDispatcher<HttpRequest<(), ScanState>>
        + CommandDispatcher<HttpRequest<(), Vec<Issue>>>
        + CommandDispatcher<HttpRequest<(), Value>>
        + CommandDispatcher<HttpRequest<FormData, Created>>
{
}

/// REST 스캔 API
pub struct RestScans<D> {
    dispatcher: Arc<D>,
}

impl<D> Clone for RestScans<D> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: Arc::clone(&self.dispatcher),
        }
    }
}

impl<D> std::fmt::Debug for RestScans<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestScans").finish_non_exhaustive()
    }
}

impl<D: ScanDispatcher> RestScans<D> {
    pub fn new(dispatcher: Arc<D>) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Arc<D> {
        &self.dispatcher
    }

    /// 스캔을 생성하고 ID를 돌려줍니다.
    pub async fn create_scan(&self, config: ScanConfig) -> Result<String, BrightError> {
        let name = config.name.clone();
        let request = commands::create_scan(config)?;
        let target = target_of(&request);
        let created = required(request.execute(self.dispatcher.as_ref()).await?, target)?;
        info!(scan_id = created.id.as_str(), name = name.as_str(), "scan created");
        Ok(created.id)
    }

    /// 스캔을 생성하고 엔티티로 돌려줍니다.
    pub async fn create(&self, config: ScanConfig) -> Result<Scan<D>, BrightError> {
        let id = self.create_scan(config).await?;
        Ok(Scan::new(id, self.clone()))
    }

    /// 기존 스캔 ID에 엔티티를 연결합니다.
    pub fn scan(&self, id: impl Into<String>) -> Result<Scan<D>, BrightError> {
        let id = id.into();
        commands::validate_scan_id(&id)?;
        Ok(Scan::new(id, self.clone()))
    }

    pub async fn get_scan_status(&self, id: &str) -> Result<ScanState, BrightError> {
        let request = commands::get_scan_status(id)?;
        let target = target_of(&request);
        let state = required(request.execute(self.dispatcher.as_ref()).await?, target)?;
        debug!(scan_id = id, status = %state.status, issues = state.total(), "scan status");
        Ok(state)
    }

    pub async fn list_issues(&self, id: &str) -> Result<Vec<Issue>, BrightError> {
        let request = commands::list_issues(id)?;
        let target = target_of(&request);
        let issues = required(request.execute(self.dispatcher.as_ref()).await?, target)?;
        debug!(scan_id = id, count = issues.len(), "scan issues fetched");
        Ok(issues)
    }

    pub async fn stop_scan(&self, id: &str) -> Result<(), BrightError> {
        commands::stop_scan(id)?
            .execute(self.dispatcher.as_ref())
            .await?;
        info!(scan_id = id, "scan stopped");
        Ok(())
    }

    pub async fn delete_scan(&self, id: &str) -> Result<(), BrightError> {
        commands::delete_scan(id)?
            .execute(self.dispatcher.as_ref())
            .await?;
        info!(scan_id = id, "scan deleted");
        Ok(())
    }

    /// HAR 파일을 업로드하고 파일 ID를 돌려줍니다.
    pub async fn upload_har(&self, har: HarFile) -> Result<String, BrightError> {
        let file_name = har.file_name.clone();
        let size = har.content.len();
        let request = commands::upload_har(har)?;
        let target = target_of(&request);
        let created = required(request.execute(self.dispatcher.as_ref()).await?, target)?;
        info!(
            file_id = created.id.as_str(),
            file_name = file_name.as_str(),
            size,
            "archive uploaded"
        );
        Ok(created.id)
    }
}

fn target_of<T, R>(request: &HttpRequest<T, R>) -> (String, String) {
    (request.method().as_str().to_owned(), request.url().to_owned())
}

fn required<R>(reply: Option<R>, (method, url): (String, String)) -> Result<R, BrightError> {
    reply.ok_or_else(|| ScanError::MissingReply { method, url }.into())
}
