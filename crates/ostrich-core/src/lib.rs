//! Core domain models, storage ports, and error handling.
//!
//! Provides the trigger event model, the error taxonomy shared by every
//! crate, a clock abstraction for deterministic timestamps, and the three
//! storage ports the ingestion pipeline writes through: the audit log, the
//! trigger queue, and the view counter.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod models;
pub mod storage;
pub mod time;

pub use error::{OstrichError, Result};
pub use models::{
    canonical_header_name, capture_headers, is_json_content_type, parse_body, RecordId,
    TriggerEvent, TriggerHeaders, TriggerSource,
};
pub use storage::{AuditLog, Storage, TriggerQueue, ViewCounter};
pub use time::{Clock, RealClock, TestClock};
