#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`models`]: API 데이터 모델 (`ScanConfig`, `ScanState`, `ScanStatus`, `HarFile`)
//! - [`commands`]: 요청 생성 함수와 요청 타입 별칭
//! - [`scans`]: REST 클라이언트 (`RestScans`, `ScanDispatcher`)
//! - [`scan`]: 스캔 핸들과 임계값 대기 (`Scan`, `ExpectOptions`, `ExpectOutcome`)
//! - [`error`]: 스캔 도메인 에러 (`ScanError`)
//!
//! # Architecture
//!
//! ```text
//! Scan --> RestScans --> commands::* --> HttpRequest --> dispatcher --> REST API
//!   |
//!   +-- expect(): status() 폴링 루프 (interval / timeout / CancellationToken)
//! ```

pub mod commands;
pub mod error;
pub mod models;
pub mod scan;
pub mod scans;

pub use error::ScanError;
pub use models::{
    Created, Discovery, HAR_CONTENT_TYPE, HarFile, ScanConfig, ScanState, ScanStatus,
    SeverityCount,
};
pub use scan::{DEFAULT_POLL_INTERVAL, ExpectOptions, ExpectOutcome, Scan};
pub use scans::{RestScans, ScanDispatcher};
