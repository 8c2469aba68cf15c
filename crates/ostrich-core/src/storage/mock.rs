//! Mock storage implementations for testing.
//!
//! Provides deterministic, in-memory stores for exercising the ingestion
//! pipeline without PostgreSQL or Redis. Each store can be switched to an
//! unavailable state or given artificial latency to simulate outages and
//! slow backends.

use std::{
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
    time::Duration,
};

use serde_json::Value;
use tokio::sync::RwLock;

use super::{
    triggers_queue::encode_payload, AuditLog, Storage, StoreFuture, TriggerQueue, ViewCounter,
};
use crate::{
    error::{OstrichError, Result},
    models::{RecordId, TriggerEvent},
};

/// Injectable failure and latency shared by every mock store.
#[derive(Default)]
struct Faults {
    unavailable: RwLock<Option<String>>,
    delay: RwLock<Option<Duration>>,
}

impl Faults {
    /// Applies configured latency, then reports the configured outage.
    async fn check(&self) -> std::result::Result<(), String> {
        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match self.unavailable.read().await.clone() {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }
}

/// In-memory audit log.
#[derive(Default)]
pub struct MockAuditLog {
    records: RwLock<Vec<(RecordId, TriggerEvent)>>,
    faults: Faults,
}

impl MockAuditLog {
    /// Creates an empty, available audit log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent operation fail with `StorageUnavailable`.
    pub async fn set_unavailable(&self, reason: impl Into<String>) {
        *self.faults.unavailable.write().await = Some(reason.into());
    }

    /// Clears an injected outage.
    pub async fn set_available(&self) {
        *self.faults.unavailable.write().await = None;
    }

    /// Delays every subsequent operation by `delay`.
    pub async fn set_delay(&self, delay: Duration) {
        *self.faults.delay.write().await = Some(delay);
    }

    async fn append(&self, event: TriggerEvent) -> Result<RecordId> {
        self.faults.check().await.map_err(OstrichError::StorageUnavailable)?;

        let id = RecordId::new();
        self.records.write().await.push((id, event));
        Ok(id)
    }

    /// Returns all stored records in append order.
    pub async fn records(&self) -> Vec<(RecordId, TriggerEvent)> {
        self.records.read().await.clone()
    }

    /// Returns stored trigger bodies in append order.
    pub async fn bodies(&self) -> Vec<Value> {
        self.records.read().await.iter().map(|(_, event)| event.body.clone()).collect()
    }

    /// Returns the number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns whether nothing has been recorded.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl AuditLog for MockAuditLog {
    fn record(&self, event: TriggerEvent) -> StoreFuture<'_, RecordId> {
        Box::pin(self.append(event))
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move { self.faults.check().await.map_err(OstrichError::StorageUnavailable) })
    }
}

/// In-memory trigger queue.
///
/// Holds entries in their encoded form, exactly as a worker would pop them.
#[derive(Default)]
pub struct MockTriggerQueue {
    entries: RwLock<Vec<String>>,
    faults: Faults,
}

impl MockTriggerQueue {
    /// Creates an empty, available queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent operation fail with `QueueUnavailable`.
    pub async fn set_unavailable(&self, reason: impl Into<String>) {
        *self.faults.unavailable.write().await = Some(reason.into());
    }

    /// Clears an injected outage.
    pub async fn set_available(&self) {
        *self.faults.unavailable.write().await = None;
    }

    /// Delays every subsequent operation by `delay`.
    pub async fn set_delay(&self, delay: Duration) {
        *self.faults.delay.write().await = Some(delay);
    }

    async fn push(&self, payload: Value) -> Result<()> {
        self.faults.check().await.map_err(OstrichError::QueueUnavailable)?;

        self.entries.write().await.push(encode_payload(&payload));
        Ok(())
    }

    /// Returns the encoded entries, head first.
    pub async fn entries(&self) -> Vec<String> {
        self.entries.read().await.clone()
    }

    /// Returns the entries decoded back into JSON, head first.
    pub async fn decoded(&self) -> Result<Vec<Value>> {
        self.entries
            .read()
            .await
            .iter()
            .map(|entry| crate::models::parse_body(entry.as_bytes()))
            .collect()
    }

    /// Returns the queue length.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns whether the queue is empty.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl TriggerQueue for MockTriggerQueue {
    fn enqueue(&self, payload: Value) -> StoreFuture<'_, ()> {
        Box::pin(self.push(payload))
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move { self.faults.check().await.map_err(OstrichError::QueueUnavailable) })
    }
}

/// In-memory view counter.
#[derive(Default)]
pub struct MockViewCounter {
    count: AtomicI64,
    faults: Faults,
}

impl MockViewCounter {
    /// Creates a counter starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent increment fail with `CounterUnavailable`.
    pub async fn set_unavailable(&self, reason: impl Into<String>) {
        *self.faults.unavailable.write().await = Some(reason.into());
    }

    async fn incr(&self) -> Result<i64> {
        self.faults.check().await.map_err(OstrichError::CounterUnavailable)?;
        Ok(self.count.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Returns the current count without incrementing.
    pub fn current(&self) -> i64 {
        self.count.load(Ordering::SeqCst)
    }
}

impl ViewCounter for MockViewCounter {
    fn increment(&self) -> StoreFuture<'_, i64> {
        Box::pin(self.incr())
    }
}

/// Bundle of mock stores with handles kept for inspection.
#[derive(Clone, Default)]
pub struct MockStorage {
    /// Audit log handle.
    pub triggers_log: Arc<MockAuditLog>,
    /// Queue handle.
    pub triggers_queue: Arc<MockTriggerQueue>,
    /// View counter handle.
    pub view_counter: Arc<MockViewCounter>,
}

impl MockStorage {
    /// Creates empty, available mock stores.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a `Storage` backed by these mocks.
    pub fn storage(&self) -> Storage {
        Storage::new(
            self.triggers_log.clone(),
            self.triggers_queue.clone(),
            self.view_counter.clone(),
        )
    }
}
