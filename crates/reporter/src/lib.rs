#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`grouper`]: 이슈 그룹핑 (`IssuesGrouper`)
//! - [`console`]: 출력 스트림 추상화 (`Console`, `StdConsole`)
//! - [`std_reporter`]: 콘솔 리포터 (`StdReporter`, `render_table`)
//! - [`check_run`]: check-run 페이로드 (`CheckRunBuilder`, `CheckRunPayload`)
//! - [`error`]: 리포터 에러 (`ReportError`)

pub mod check_run;
pub mod console;
pub mod error;
pub mod grouper;
pub mod std_reporter;

pub use check_run::{
    Annotation, AnnotationLevel, CheckRunBuilder, CheckRunOutput, CheckRunPayload, Conclusion,
    DEFAULT_CHECK_NAME, MAX_ANNOTATIONS,
};
pub use console::{Console, StdConsole};
pub use error::ReportError;
pub use grouper::IssuesGrouper;
pub use std_reporter::{StdReporter, render_table};
