//! Redis-backed trigger queue.
//!
//! Bodies are pushed as compact JSON text onto the tail of the
//! `triggers_queue` list. Workers pop from the head; nothing here reads
//! the queue except the test helper [`RedisTriggerQueue::entries`].

use redis::{aio::ConnectionManager, AsyncCommands};
use serde_json::Value;
use tracing::debug;

use super::{StoreFuture, TriggerQueue, TRIGGERS_QUEUE_KEY};
use crate::error::{OstrichError, Result};

/// Encodes a trigger body the way queue consumers expect it.
///
/// A null body becomes the text `null`.
pub fn encode_payload(payload: &Value) -> String {
    payload.to_string()
}

/// Queue publisher over a Redis list.
pub struct RedisTriggerQueue {
    conn: ConnectionManager,
    key: String,
}

impl RedisTriggerQueue {
    /// Creates a publisher for the default `triggers_queue` list.
    pub fn new(conn: ConnectionManager) -> Self {
        Self::with_key(conn, TRIGGERS_QUEUE_KEY)
    }

    /// Creates a publisher for a specific list key.
    pub fn with_key(conn: ConnectionManager, key: impl Into<String>) -> Self {
        Self { conn, key: key.into() }
    }

    /// Appends an encoded body to the tail of the list.
    ///
    /// # Errors
    ///
    /// Returns `QueueUnavailable` if Redis rejects or cannot receive the push.
    pub async fn push(&self, payload: &Value) -> Result<()> {
        let mut conn = self.conn.clone();
        let length: i64 = conn
            .rpush(&self.key, encode_payload(payload))
            .await
            .map_err(|e| OstrichError::queue(&e))?;

        debug!(queue = %self.key, queue_length = length, "Enqueued trigger body");
        Ok(())
    }

    /// Sends `PING` on the shared connection.
    ///
    /// # Errors
    ///
    /// Returns `QueueUnavailable` if Redis does not answer.
    pub async fn health_check(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: String =
            redis::cmd("PING").query_async(&mut conn).await.map_err(|e| OstrichError::queue(&e))?;
        Ok(())
    }

    /// Returns every queued entry, head first.
    ///
    /// # Errors
    ///
    /// Returns `QueueUnavailable` if Redis cannot be reached.
    pub async fn entries(&self) -> Result<Vec<String>> {
        let mut conn = self.conn.clone();
        conn.lrange(&self.key, 0, -1).await.map_err(|e| OstrichError::queue(&e))
    }
}

impl TriggerQueue for RedisTriggerQueue {
    fn enqueue(&self, payload: Value) -> StoreFuture<'_, ()> {
        Box::pin(async move { self.push(&payload).await })
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(self.health_check())
    }
}
