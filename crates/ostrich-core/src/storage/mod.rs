//! Storage ports for the ingestion pipeline and their production backends.
//!
//! The handlers never talk to PostgreSQL or Redis directly. They go through
//! three narrow ports:
//!
//! - [`AuditLog`]: append-only document log of every received trigger
//!   (PostgreSQL, [`triggers_log`]).
//! - [`TriggerQueue`]: FIFO work queue consumed by external workers
//!   (Redis list, [`triggers_queue`]).
//! - [`ViewCounter`]: atomic page-view counter (Redis key,
//!   [`view_counter`]).
//!
//! [`mock`] provides in-memory implementations with failure and latency
//! injection for tests.

use std::{future::Future, pin::Pin, sync::Arc};

use redis::aio::ConnectionManager;
use serde_json::Value;
use sqlx::PgPool;

pub mod mock;
pub mod triggers_log;
pub mod triggers_queue;
pub mod view_counter;

use crate::{
    error::Result,
    models::{RecordId, TriggerEvent},
};

/// Collection (table) the audit log appends to.
pub const TRIGGERS_LOG_COLLECTION: &str = "triggers_log";

/// Redis list the trigger bodies are pushed onto.
pub const TRIGGERS_QUEUE_KEY: &str = "triggers_queue";

/// Redis key holding the root page view count.
pub const VIEWS_KEY: &str = "views";

/// Boxed future returned by every storage port.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Append-only audit log of received triggers.
pub trait AuditLog: Send + Sync + 'static {
    /// Appends the trigger as a new immutable document.
    ///
    /// Returns the store-generated record id. Fails with
    /// `StorageUnavailable` when the store is unreachable or the write is
    /// not committed. Never retries.
    fn record(&self, event: TriggerEvent) -> StoreFuture<'_, RecordId>;

    /// Checks that the document store answers.
    fn ping(&self) -> StoreFuture<'_, ()>;
}

/// FIFO work queue of trigger bodies.
pub trait TriggerQueue: Send + Sync + 'static {
    /// Serializes the payload and appends it to the tail of the queue.
    ///
    /// Each call is one atomic append. Fails with `QueueUnavailable` when
    /// the store is unreachable. Never retries.
    fn enqueue(&self, payload: Value) -> StoreFuture<'_, ()>;

    /// Checks that the key-value store answers.
    fn ping(&self) -> StoreFuture<'_, ()>;
}

/// Monotonic page-view counter.
pub trait ViewCounter: Send + Sync + 'static {
    /// Atomically increments the counter and returns the new value.
    fn increment(&self) -> StoreFuture<'_, i64>;
}

/// Store handles shared by every request.
///
/// Created once at startup and injected into the HTTP layer. Cloning is
/// cheap; all clones share the same underlying clients.
#[derive(Clone)]
pub struct Storage {
    /// Audit log writer.
    pub triggers_log: Arc<dyn AuditLog>,

    /// Queue publisher.
    pub triggers_queue: Arc<dyn TriggerQueue>,

    /// Root page view counter.
    pub view_counter: Arc<dyn ViewCounter>,
}

impl Storage {
    /// Assembles storage from explicit port implementations.
    pub fn new(
        triggers_log: Arc<dyn AuditLog>,
        triggers_queue: Arc<dyn TriggerQueue>,
        view_counter: Arc<dyn ViewCounter>,
    ) -> Self {
        Self { triggers_log, triggers_queue, view_counter }
    }

    /// Creates production storage over a PostgreSQL pool and a Redis
    /// connection manager.
    ///
    /// Both clients are safe for concurrent use; the queue and the counter
    /// share the same multiplexed Redis connection.
    pub fn connect(pool: PgPool, redis: ConnectionManager) -> Self {
        Self {
            triggers_log: Arc::new(triggers_log::Repository::new(Arc::new(pool))),
            triggers_queue: Arc::new(triggers_queue::RedisTriggerQueue::new(redis.clone())),
            view_counter: Arc::new(view_counter::RedisViewCounter::new(redis)),
        }
    }
}
