//! Redis-backed page view counter.

use redis::{aio::ConnectionManager, AsyncCommands};

use super::{StoreFuture, ViewCounter, VIEWS_KEY};
use crate::error::{OstrichError, Result};

/// View counter stored under a single Redis key.
///
/// Uses the value returned by `INCR` rather than a follow-up `GET`, so
/// concurrent visitors each see a distinct count.
pub struct RedisViewCounter {
    conn: ConnectionManager,
    key: String,
}

impl RedisViewCounter {
    /// Creates a counter over the default `views` key.
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn, key: VIEWS_KEY.to_string() }
    }

    /// Increments the key by one and returns the new value.
    ///
    /// # Errors
    ///
    /// Returns `CounterUnavailable` if Redis cannot be reached.
    pub async fn incr(&self) -> Result<i64> {
        let mut conn = self.conn.clone();
        let count: i64 = conn.incr(&self.key, 1).await.map_err(|e| OstrichError::counter(&e))?;
        Ok(count)
    }
}

impl ViewCounter for RedisViewCounter {
    fn increment(&self) -> StoreFuture<'_, i64> {
        Box::pin(self.incr())
    }
}
