//! Liveness and readiness probes.
//!
//! `/healthz` never touches storage. `/readyz` pings the document store and
//! the key-value store, each under the audit/enqueue deadlines, and reports
//! both.

use std::{sync::Arc, time::Duration};

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use ostrich_core::{storage::StoreFuture, Clock, Storage};
use serde::Serialize;
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use crate::{ingest::IngestConfig, state::AppState};

/// Readiness report.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall service health status
    pub status: HealthStatus,
    /// Timestamp when the check was performed
    pub timestamp: DateTime<Utc>,
    /// Individual store checks
    pub checks: HealthChecks,
    /// Service version
    pub version: String,
}

/// Overall health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Both stores answer
    Healthy,
    /// At least one store is down
    Unhealthy,
}

/// Per-store check results.
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    /// Audit log backend
    pub document_store: ComponentHealth,
    /// Queue and counter backend
    pub key_value_store: ComponentHealth,
}

/// Health of one store.
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    /// Component status
    pub status: ComponentStatus,
    /// Failure reason when down
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Ping round trip in milliseconds
    pub response_time_ms: u64,
}

/// Component-level status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    /// Answered within the deadline
    Up,
    /// Failed or timed out
    Down,
}

/// Readiness checker with an injected clock for deterministic reports.
pub struct HealthService {
    clock: Arc<dyn Clock>,
    deadlines: IngestConfig,
}

impl HealthService {
    /// Creates a health service with the given clock and ping deadlines.
    pub fn new(clock: Arc<dyn Clock>, deadlines: IngestConfig) -> Self {
        Self { clock, deadlines }
    }

    /// Pings both stores concurrently.
    pub async fn check(&self, storage: &Storage) -> HealthResponse {
        debug!("Performing readiness check");

        let timestamp = self.clock.now_utc();
        let (document_store, key_value_store) = tokio::join!(
            self.probe("document_store", self.deadlines.audit_timeout, storage.triggers_log.ping()),
            self.probe(
                "key_value_store",
                self.deadlines.enqueue_timeout,
                storage.triggers_queue.ping()
            ),
        );

        let status = if document_store.status == ComponentStatus::Up
            && key_value_store.status == ComponentStatus::Up
        {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        };

        HealthResponse {
            status,
            timestamp,
            checks: HealthChecks { document_store, key_value_store },
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    async fn probe(
        &self,
        component: &'static str,
        deadline: Duration,
        ping: StoreFuture<'_, ()>,
    ) -> ComponentHealth {
        let start = self.clock.now();
        let outcome = timeout(deadline, ping).await;
        let elapsed = self.clock.now().saturating_duration_since(start);
        let response_time_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

        let message = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(e.to_string()),
            Err(_) => Some(format!("ping timed out after {deadline:?}")),
        };

        let status = match &message {
            None => ComponentStatus::Up,
            Some(reason) => {
                warn!(component, reason = %reason, "Store readiness check failed");
                ComponentStatus::Down
            },
        };

        ComponentHealth { status, message, response_time_ms }
    }
}

/// Readiness probe.
///
/// `200` when both stores answer, `503` otherwise.
#[instrument(name = "readiness_check", skip(state))]
pub async fn readiness_check(State(state): State<AppState>) -> Response {
    let service = HealthService::new(state.clock.clone(), state.ingest);
    let response = service.check(&state.storage).await;

    let status_code = match response.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    debug!(
        status = ?response.status,
        document_store = ?response.checks.document_store.status,
        key_value_store = ?response.checks.key_value_store.status,
        "Readiness check completed"
    );

    (status_code, Json(response)).into_response()
}

/// Liveness probe. Always `200 OK`.
#[instrument(name = "liveness_check")]
pub async fn liveness_check() -> &'static str {
    "OK"
}
