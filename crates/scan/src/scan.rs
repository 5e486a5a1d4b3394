//! 스캔 엔티티
//!
//! [`Scan`]은 스캔 ID 하나에 묶인 핸들입니다. [`Scan::expect`]는 상태를
//! 주기적으로 조회하면서 다음 중 하나가 일어날 때까지 기다립니다.
//!
//! - 임계 심각도 이상의 이슈 발견
//! - 스캔 종료 (`done`, `failed`, `stopped`, `disrupted`)
//! - 타임아웃
//! - [`CancellationToken`] 취소

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use bright_core::dispatcher::IssueSource;
use bright_core::error::BrightError;
use bright_core::metrics as m;
use bright_core::types::{Issue, Severity};

use crate::error::ScanError;
use crate::models::ScanState;
use crate::scans::{RestScans, ScanDispatcher};

/// 기본 폴링 간격
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// [`Scan::expect`] 옵션
#[derive(Debug, Clone)]
pub struct ExpectOptions {
    /// 상태 조회 간격
    pub interval: Duration,
    /// 전체 대기 한도 (없으면 무기한)
    pub timeout: Option<Duration>,
    /// 외부 취소 신호
    pub cancel: CancellationToken,
}

impl Default for ExpectOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: None,
            cancel: CancellationToken::new(),
        }
    }
}

impl ExpectOptions {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    fn validate(&self) -> Result<(), ScanError> {
        if self.interval.is_zero() {
            return Err(ScanError::InvalidConfig {
                field: "interval".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }
        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(ScanError::InvalidConfig {
                field: "timeout".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }
        Ok(())
    }
}

/// [`Scan::expect`]가 끝난 이유
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectOutcome {
    /// 임계 심각도 이상의 이슈가 발견됨
    ThresholdReached(ScanState),
    /// 임계값에 닿지 않고 스캔이 종료됨
    Finished(ScanState),
    /// 타임아웃
    TimedOut,
    /// 취소됨
    Cancelled,
}

impl ExpectOutcome {
    pub fn threshold_reached(&self) -> bool {
        matches!(self, Self::ThresholdReached(_))
    }
}

/// 원격 스캔 핸들
pub struct Scan<D> {
    id: String,
    scans: RestScans<D>,
}

impl<D> Clone for Scan<D> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            scans: self.scans.clone(),
        }
    }
}

impl<D> std::fmt::Debug for Scan<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scan").field("id", &self.id).finish()
    }
}

impl<D: ScanDispatcher> Scan<D> {
    pub(crate) fn new(id: String, scans: RestScans<D>) -> Self {
        Self { id, scans }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// 지금까지 발견된 이슈 목록
    pub async fn issues(&self) -> Result<Vec<Issue>, BrightError> {
        self.scans.list_issues(&self.id).await
    }

    pub async fn status(&self) -> Result<ScanState, BrightError> {
        self.scans.get_scan_status(&self.id).await
    }

    /// 진행 중인 스캔을 중지합니다. 이미 끝난 스캔이면 아무것도 하지 않습니다.
    pub async fn stop(&self) -> Result<(), BrightError> {
        let state = self.status().await?;
        if state.status.is_terminal() {
            debug!(scan_id = self.id.as_str(), status = %state.status, "scan already finished");
            return Ok(());
        }
        self.scans.stop_scan(&self.id).await
    }

    /// 스캔을 중지하고 삭제합니다.
    pub async fn dispose(&self) -> Result<(), BrightError> {
        self.stop().await?;
        self.scans.delete_scan(&self.id).await
    }

    /// 임계 심각도 이상의 이슈가 나오거나 스캔이 끝날 때까지 기다립니다.
    pub async fn expect(
        &self,
        threshold: Severity,
        options: ExpectOptions,
    ) -> Result<ExpectOutcome, BrightError> {
        options.validate()?;

        let deadline = options.timeout.map(|t| Instant::now() + t);
        let timeout = async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(timeout);

        info!(
            scan_id = self.id.as_str(),
            threshold = threshold.as_label(),
            interval_ms = u64::try_from(options.interval.as_millis()).unwrap_or(u64::MAX),
            "waiting for scan"
        );

        loop {
            let state = tokio::select! {
                biased;
                _ = options.cancel.cancelled() => return Ok(ExpectOutcome::Cancelled),
                _ = &mut timeout => return Ok(ExpectOutcome::TimedOut),
                state = self.status() => state?,
            };
            metrics::counter!(m::SCAN_STATUS_POLLS_TOTAL).increment(1);

            let hits = state.count_at_or_above(threshold);
            if hits > 0 {
                info!(
                    scan_id = self.id.as_str(),
                    threshold = threshold.as_label(),
                    hits,
                    "severity threshold reached"
                );
                return Ok(ExpectOutcome::ThresholdReached(state));
            }
            if state.status.is_terminal() {
                info!(scan_id = self.id.as_str(), status = %state.status, "scan finished");
                return Ok(ExpectOutcome::Finished(state));
            }

            tokio::select! {
                biased;
                _ = options.cancel.cancelled() => return Ok(ExpectOutcome::Cancelled),
                _ = &mut timeout => return Ok(ExpectOutcome::TimedOut),
                _ = tokio::time::sleep(options.interval) => {}
            }
        }
    }
}

impl<D: ScanDispatcher> IssueSource for Scan<D> {
    async fn issues(&self) -> Result<Vec<Issue>, BrightError> {
        self.scans.list_issues(&self.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let options = ExpectOptions::default();
        assert_eq!(options.interval, DEFAULT_POLL_INTERVAL);
        assert!(options.timeout.is_none());
        assert!(!options.cancel.is_cancelled());
    }

    #[test]
    fn options_reject_zero_durations() {
        assert!(
            ExpectOptions::default()
                .with_interval(Duration::ZERO)
                .validate()
                .is_err()
        );
        assert!(
            ExpectOptions::default()
                .with_timeout(Duration::ZERO)
                .validate()
                .is_err()
        );
        assert!(
            ExpectOptions::default()
                .with_timeout(Duration::from_secs(1))
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn outcome_threshold_flag() {
        assert!(!ExpectOutcome::TimedOut.threshold_reached());
        assert!(!ExpectOutcome::Cancelled.threshold_reached());
    }
}
