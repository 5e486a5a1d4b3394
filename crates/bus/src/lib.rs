#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`bus`]: 프로세스 내 버스 구현 (`InMemoryEventBus`)
//! - [`error`]: 버스 도메인 에러 (`BusError`)
//!
//! # Architecture
//!
//! ```text
//! Event --publish--> InMemoryEventBus --Envelope--> handler 1, handler 2, ...
//! Command --execute--> InMemoryEventBus --Envelope--> first handler --reply--> R
//! ```

pub mod bus;
pub mod error;

pub use bus::InMemoryEventBus;
pub use error::BusError;
