//! Trigger ingestion pipeline.
//!
//! One pass per request: parse the body, append the trigger to the audit
//! log, then push the body onto the work queue. The two writes are
//! sequential and not transactional:
//!
//! - audit not confirmed: nothing is queued. An expired audit deadline
//!   does not cancel a write the database already accepted, so the record
//!   may still appear.
//! - enqueue not confirmed after a successful audit: the trigger is audited
//!   and may or may not be queued. The record id is logged so the gap can
//!   be reconciled.
//!
//! Both writes run under their own deadline; an expired deadline counts as
//! the store being unavailable.

use std::{sync::Arc, time::Duration};

use axum::http::HeaderMap;
use ostrich_core::{
    capture_headers, is_json_content_type, parse_body, Clock, OstrichError, RecordId, Result,
    Storage, TriggerEvent, TriggerHeaders,
};
use serde_json::Value;
use tokio::time::timeout;
use tracing::{debug, error, info};

use crate::state::AppState;

/// Store deadlines for the ingestion path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestConfig {
    /// Deadline for the audit log append.
    pub audit_timeout: Duration,
    /// Deadline for the queue push.
    pub enqueue_timeout: Duration,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self { audit_timeout: Duration::from_secs(5), enqueue_timeout: Duration::from_secs(5) }
    }
}

/// Orchestrates persist-then-enqueue for a single trigger.
pub struct TriggerIngestor {
    storage: Storage,
    clock: Arc<dyn Clock>,
    config: IngestConfig,
}

impl TriggerIngestor {
    /// Creates an ingestor over explicit collaborators.
    pub fn new(storage: Storage, clock: Arc<dyn Clock>, config: IngestConfig) -> Self {
        Self { storage, clock, config }
    }

    /// Creates an ingestor from router state.
    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.storage.clone(), state.clock.clone(), state.ingest)
    }

    /// Records and enqueues one trigger.
    ///
    /// The body is parsed only when `Content-Type` declares JSON
    /// (`application/json` or `application/*+json`). Any other content
    /// type, or an empty or malformed body, is recorded and queued as
    /// `null`.
    ///
    /// # Errors
    ///
    /// - `StorageUnavailable` if the audit append fails or is not confirmed
    ///   in time. The queue is not touched.
    /// - `QueueUnavailable` if the push fails or is not confirmed in time.
    ///   The audit record exists; the entry may or may not be queued.
    pub async fn ingest(&self, headers: TriggerHeaders, raw_body: &[u8]) -> Result<RecordId> {
        let body = decode_body(headers.get("Content-Type").map(String::as_str), raw_body);
        debug!(headers = ?headers, body = %body, "Trigger received");

        let event = TriggerEvent::from_api(self.clock.now_utc(), headers, body.clone());
        let record_id = self.record(event).await?;
        info!(record_id = %record_id, "Trigger audited");

        if let Err(e) = self.enqueue(body).await {
            error!(
                record_id = %record_id,
                code = e.code(),
                error = %e,
                "Trigger audited, enqueue not confirmed"
            );
            return Err(e);
        }

        debug!(record_id = %record_id, "Trigger queued");
        Ok(record_id)
    }

    async fn record(&self, event: TriggerEvent) -> Result<RecordId> {
        let deadline = self.config.audit_timeout;
        timeout(deadline, self.storage.triggers_log.record(event)).await.map_err(|_| {
            OstrichError::StorageUnavailable(format!(
                "audit write not confirmed within {deadline:?}"
            ))
        })?
    }

    async fn enqueue(&self, body: Value) -> Result<()> {
        let deadline = self.config.enqueue_timeout;
        timeout(deadline, self.storage.triggers_queue.enqueue(body)).await.map_err(|_| {
            OstrichError::QueueUnavailable(format!("enqueue not confirmed within {deadline:?}"))
        })?
    }
}

fn decode_body(content_type: Option<&str>, raw_body: &[u8]) -> Value {
    match content_type {
        Some(content_type) if is_json_content_type(content_type) => {
            parse_body(raw_body).unwrap_or_else(|e| {
                debug!(code = e.code(), error = %e, "Trigger body is not JSON, using null");
                Value::Null
            })
        },
        content_type => {
            debug!(content_type = ?content_type, "Trigger body not declared as JSON, using null");
            Value::Null
        },
    }
}

/// Captures request headers into the trigger header map.
pub fn extract_headers(headers: &HeaderMap) -> TriggerHeaders {
    capture_headers(headers.iter().map(|(name, value)| (name.as_str(), value.as_bytes())))
}
