//! Error types and result handling for trigger ingestion.
//!
//! Defines the error taxonomy with stable codes so callers can tell an
//! unconfirmed audit write from an audited trigger whose enqueue was not
//! confirmed, even though both map to the same HTTP status.

use thiserror::Error;

/// Result type alias using `OstrichError`.
pub type Result<T> = std::result::Result<T, OstrichError>;

/// Ostrich error types with stable codes.
#[derive(Debug, Clone, Error)]
pub enum OstrichError {
    /// Inbound body is not valid JSON (E1001).
    ///
    /// Recovered locally: the trigger is still processed with a null body.
    #[error("[E1001] Unparseable trigger body: {0}")]
    Parse(String),

    /// Document store unreachable or write rejected (E3001).
    #[error("[E3001] Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Key-value store unreachable or enqueue rejected (E3002).
    #[error("[E3002] Queue unavailable: {0}")]
    QueueUnavailable(String),

    /// Key-value store unreachable while incrementing the view counter
    /// (E3003).
    #[error("[E3003] Counter unavailable: {0}")]
    CounterUnavailable(String),
}

impl OstrichError {
    /// Returns the error code (E1001-E3003).
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "E1001",
            Self::StorageUnavailable(_) => "E3001",
            Self::QueueUnavailable(_) => "E3002",
            Self::CounterUnavailable(_) => "E3003",
        }
    }

    /// Returns whether repeating the failed operation could succeed.
    ///
    /// The service itself never retries; this is exposed for callers and
    /// relays that sit in front of it.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::StorageUnavailable(_) | Self::QueueUnavailable(_) | Self::CounterUnavailable(_)
        )
    }

    /// Maps a Redis failure on the queue path.
    pub fn queue(err: &redis::RedisError) -> Self {
        Self::QueueUnavailable(err.to_string())
    }

    /// Maps a Redis failure on the counter path.
    pub fn counter(err: &redis::RedisError) -> Self {
        Self::CounterUnavailable(err.to_string())
    }
}

impl From<sqlx::Error> for OstrichError {
    fn from(err: sqlx::Error) -> Self {
        Self::StorageUnavailable(err.to_string())
    }
}
