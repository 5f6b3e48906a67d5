//! Core types for cotick.
//!
//! This crate holds the small vocabulary shared by every layer of the
//! cooperative scheduler:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  cotick-cli      : binary, stdin loop, tracing setup      │
//! ├──────────────────────────────────────────────────────────┤
//! │  cotick-runtime  : config layering, Host wiring           │
//! ├──────────────────────────────────────────────────────────┤
//! │  cotick-routine  : instruction tree, routine parser       │
//! ├──────────────────────────────────────────────────────────┤
//! │  cotick-command  : tokenizer, commands, dispatcher        │
//! ├──────────────────────────────────────────────────────────┤
//! │  cotick-process  : process arena, scheduler, save hooks   │
//! ├──────────────────────────────────────────────────────────┤
//! │  cotick-types    : ids, triggers, results, ErrorCode ◄ HERE│
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use cotick_types::{ProcessId, ProcessResult, Trigger};
//!
//! let pid = ProcessId::new(7);
//! assert_eq!(pid.to_string(), "7");
//!
//! assert!(Trigger::Cmd > Trigger::User);
//! assert!(ProcessResult::Ok.is_ok());
//! ```

mod error;
mod id;
mod logger;
mod trigger;

pub use error::{assert_error_code, assert_error_codes, ErrorCode};
pub use id::{ProcessId, ProcessResult};
pub use logger::{LogSink, Logger};
pub use trigger::Trigger;
