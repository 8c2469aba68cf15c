//! Shared router state.

use std::{sync::Arc, time::Duration};

use ostrich_core::{Clock, RealClock, Storage};

use crate::ingest::IngestConfig;

/// Bounds applied to every inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpLimits {
    /// Whole-request deadline.
    pub request_timeout: Duration,
    /// Largest accepted request body.
    pub max_body_bytes: usize,
}

impl Default for HttpLimits {
    fn default() -> Self {
        Self { request_timeout: Duration::from_secs(30), max_body_bytes: 10 * 1024 * 1024 }
    }
}

/// State injected into every handler.
///
/// Owns nothing itself: the store clients behind `storage` are created and
/// closed by the process entry point.
#[derive(Clone)]
pub struct AppState {
    /// Audit log, queue and view counter handles.
    pub storage: Storage,
    /// Source of receipt timestamps.
    pub clock: Arc<dyn Clock>,
    /// Store timeouts for the ingestion path.
    pub ingest: IngestConfig,
    /// Request deadline and body limit.
    pub limits: HttpLimits,
}

impl AppState {
    /// Creates state with the system clock and default limits.
    pub fn new(storage: Storage) -> Self {
        Self::with_clock(storage, Arc::new(RealClock::new()))
    }

    /// Creates state with an explicit clock and default limits.
    pub fn with_clock(storage: Storage, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock, ingest: IngestConfig::default(), limits: HttpLimits::default() }
    }

    /// Replaces the ingestion store timeouts.
    #[must_use]
    pub fn ingest_config(mut self, ingest: IngestConfig) -> Self {
        self.ingest = ingest;
        self
    }

    /// Replaces the request limits.
    #[must_use]
    pub fn http_limits(mut self, limits: HttpLimits) -> Self {
        self.limits = limits;
        self
    }
}
