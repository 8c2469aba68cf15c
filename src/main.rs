//! Ostrich trigger ingestion service.
//!
//! Main entry point. Loads configuration, connects the document store and
//! the key-value store, serves HTTP until a shutdown signal, then releases
//! the store clients.

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use ostrich_api::{config::DEFAULT_LOG_FILTER, AppState, Config};
use ostrich_core::{storage::triggers_log, RealClock, Storage};
use redis::aio::ConnectionManager;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    init_tracing(config.log_filter());

    info!("Starting Ostrich trigger service");
    info!(
        database_url = %config.database_url_masked(),
        redis_url = %config.redis_url(),
        host = %config.host,
        port = config.port,
        max_connections = config.database_max_connections,
        "Configuration loaded"
    );

    let db_pool = create_database_pool(&config).await?;
    info!("Database connection pool established");

    triggers_log::Repository::migrate(&db_pool)
        .await
        .context("Failed to create triggers_log table")?;
    info!("Audit log schema ready");

    let redis = connect_redis(&config).await?;
    info!("Redis connection established");

    let state = AppState::with_clock(Storage::connect(db_pool.clone(), redis), Arc::new(RealClock))
        .ingest_config(config.to_ingest_config())
        .http_limits(config.to_http_limits());

    let addr = config.parse_server_addr()?;
    ostrich_api::start_server(state, addr).await.context("HTTP server failed")?;

    db_pool.close().await;
    info!("Database connections closed");

    info!("Ostrich shutdown complete");
    Ok(())
}

/// Initializes tracing with the configured filter directives.
///
/// Directives that do not parse fall back to the default filter.
fn init_tracing(directives: &str) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter =
        EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}

/// Creates the database connection pool with retry logic.
async fn create_database_pool(config: &Config) -> Result<sqlx::PgPool> {
    const MAX_RETRIES: u32 = 5;
    const RETRY_DELAY: Duration = Duration::from_secs(2);
    let mut retries = 0;

    loop {
        match PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connection_timeout))
            .idle_timeout(Duration::from_secs(config.database_idle_timeout))
            .max_lifetime(Duration::from_secs(config.database_max_lifetime))
            .connect(&config.database_url)
            .await
        {
            Ok(pool) => {
                sqlx::query("SELECT 1")
                    .fetch_one(&pool)
                    .await
                    .context("Failed to verify database connection")?;

                return Ok(pool);
            },
            Err(_e) if retries < MAX_RETRIES => {
                retries += 1;
                info!(
                    attempt = retries,
                    max_retries = MAX_RETRIES,
                    "Database connection failed, retrying..."
                );
                tokio::time::sleep(RETRY_DELAY).await;
            },
            Err(e) => {
                return Err(e).context("Failed to create database connection pool after retries");
            },
        }
    }
}

/// Opens the shared, auto-reconnecting Redis connection.
async fn connect_redis(config: &Config) -> Result<ConnectionManager> {
    let client = redis::Client::open(config.redis_url()).context("Invalid Redis URL")?;
    client.get_connection_manager().await.context("Failed to connect to Redis")
}
