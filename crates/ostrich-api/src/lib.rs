//! Ostrich HTTP API.
//!
//! Routes, the ingestion orchestrator behind `POST /trigger`, and the
//! service configuration.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod handlers;
pub mod ingest;
pub mod server;
pub mod state;

pub use config::Config;
pub use ingest::{IngestConfig, TriggerIngestor};
pub use server::{create_router, start_server};
pub use state::{AppState, HttpLimits};
