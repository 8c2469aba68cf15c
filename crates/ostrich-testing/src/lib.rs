//! Test infrastructure for deterministic service tests.
//!
//! Provides an in-memory store environment with a pinned clock, request
//! fixtures for the trigger endpoint, and response helpers.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

use std::{
    sync::Arc,
    time::{Duration, UNIX_EPOCH},
};

use ostrich_core::{storage::mock::MockStorage, Clock, OstrichError, Storage, TestClock};
use serde_json::Value;

pub mod fixtures;
pub mod http;

pub use fixtures::TriggerRequestBuilder;

/// Fixed receipt time used by every `TestEnv`: 2017-06-01T12:00:00Z.
pub const TEST_EPOCH_SECS: u64 = 1_496_318_400;

/// Test environment backed by mock stores.
///
/// Hand `storage()` and `clock()` to the code under test, then inspect
/// what landed in the audit log and the queue through the `mocks` handles.
pub struct TestEnv {
    /// Mock stores with fault injection.
    pub mocks: MockStorage,
    /// Deterministic clock starting at [`TEST_EPOCH_SECS`].
    pub clock: TestClock,
}

impl TestEnv {
    /// Creates an environment with empty, available stores.
    pub fn new() -> Self {
        Self {
            mocks: MockStorage::new(),
            clock: TestClock::with_start_time(UNIX_EPOCH + Duration::from_secs(TEST_EPOCH_SECS)),
        }
    }

    /// Storage handles backed by the mocks.
    pub fn storage(&self) -> Storage {
        self.mocks.storage()
    }

    /// The test clock as a trait object.
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::new(self.clock.clone())
    }

    /// Bodies appended to the audit log, oldest first.
    pub async fn audited_bodies(&self) -> Vec<Value> {
        self.mocks.triggers_log.bodies().await
    }

    /// Queue entries decoded back to JSON, head first.
    ///
    /// # Errors
    ///
    /// Fails if an entry is not valid JSON text.
    pub async fn queued_bodies(&self) -> Result<Vec<Value>, OstrichError> {
        self.mocks.triggers_queue.decoded().await
    }

    /// Takes the audit log offline.
    pub async fn fail_audit_log(&self) {
        self.mocks.triggers_log.set_unavailable("document store unreachable").await;
    }

    /// Takes the queue offline.
    pub async fn fail_queue(&self) {
        self.mocks.triggers_queue.set_unavailable("key-value store unreachable").await;
    }

    /// Takes the view counter offline.
    pub async fn fail_view_counter(&self) {
        self.mocks.view_counter.set_unavailable("key-value store unreachable").await;
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
