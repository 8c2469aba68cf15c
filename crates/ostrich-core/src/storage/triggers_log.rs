//! PostgreSQL-backed audit log.
//!
//! Each trigger is one row in `triggers_log` whose `document` column holds
//! the trigger as `json`, not `jsonb`. The text is stored as sent, so
//! escapes `jsonb` refuses (`\u0000`) and number text beyond `numeric`
//! formatting survive. Rows are only ever inserted.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::debug;

use super::{AuditLog, StoreFuture};
use crate::{
    error::{OstrichError, Result},
    models::{RecordId, TriggerEvent},
};

/// Repository for audit log operations.
pub struct Repository {
    pool: Arc<PgPool>,
}

impl Repository {
    /// Creates a new repository instance.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Returns a reference to the database pool.
    pub fn pool(&self) -> Arc<PgPool> {
        self.pool.clone()
    }

    /// Creates the `triggers_log` table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if the DDL cannot be executed.
    pub async fn migrate(pool: &PgPool) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS triggers_log (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                document JSON NOT NULL,
                inserted_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            ",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_triggers_log_inserted_at
            ON triggers_log(inserted_at)
            ",
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Appends a trigger document and returns the generated id.
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if the insert fails.
    pub async fn insert(&self, event: &TriggerEvent) -> Result<RecordId> {
        let document = serde_json::to_string(event)
            .map_err(|e| OstrichError::StorageUnavailable(format!("unencodable trigger: {e}")))?;

        let id: RecordId = sqlx::query_scalar(
            "INSERT INTO triggers_log (document) VALUES ($1::text::json) RETURNING id",
        )
        .bind(document)
        .fetch_one(&*self.pool)
        .await?;

        debug!(record_id = %id, "Appended trigger to audit log");
        Ok(id)
    }

    /// Finds a stored trigger by record id.
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if the query fails.
    pub async fn find_by_id(&self, id: RecordId) -> Result<Option<TriggerEvent>> {
        let document: Option<String> =
            sqlx::query_scalar("SELECT document::text FROM triggers_log WHERE id = $1")
                .bind(id)
                .fetch_optional(&*self.pool)
                .await?;

        document
            .map(|text| {
                serde_json::from_str(&text).map_err(|e| {
                    OstrichError::StorageUnavailable(format!("corrupt audit record {id}: {e}"))
                })
            })
            .transpose()
    }

    /// Executes a trivial query to verify connectivity.
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if the connection is unhealthy.
    pub async fn health_check(&self) -> Result<()> {
        let _: (i32,) = sqlx::query_as("SELECT 1").fetch_one(&*self.pool).await?;
        Ok(())
    }

    /// Counts stored triggers.
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if the query fails.
    pub async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM triggers_log")
            .fetch_one(&*self.pool)
            .await?;

        Ok(count)
    }
}

impl AuditLog for Repository {
    fn record(&self, event: TriggerEvent) -> StoreFuture<'_, RecordId> {
        Box::pin(async move { self.insert(&event).await })
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(self.health_check())
    }
}
