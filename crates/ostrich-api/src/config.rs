//! Configuration management for the Ostrich trigger service.

use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::{ingest::IngestConfig, state::HttpLimits};

const CONFIG_FILE: &str = "config.toml";

/// Log filter used when `RUST_LOG` is unset or blank.
pub const DEFAULT_LOG_FILTER: &str = "info,ostrich=debug,tower_http=debug";

/// Complete service configuration with defaults, file, and environment
/// overrides.
///
/// Configuration is loaded in priority order:
/// 1. Environment variables (highest priority)
/// 2. Configuration file (`config.toml`)
/// 3. Built-in defaults (lowest priority)
///
/// The defaults match a compose-style deployment where the stores are
/// reachable as `postgres` and `redis`.
///
/// # Example
///
/// ```no_run
/// use ostrich_api::Config;
///
/// let config = Config::load().expect("Failed to load configuration");
///
/// println!("Server will bind to {}:{}", config.host, config.port);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    // Document store
    /// PostgreSQL connection URL.
    ///
    /// Environment variable: `DATABASE_URL`
    #[serde(default = "default_database_url", alias = "DATABASE_URL")]
    pub database_url: String,
    /// Maximum number of database connections in the pool.
    ///
    /// Environment variable: `DATABASE_MAX_CONNECTIONS`
    #[serde(default = "default_max_connections", alias = "DATABASE_MAX_CONNECTIONS")]
    pub database_max_connections: u32,
    /// Minimum number of connections to maintain in the pool.
    ///
    /// Environment variable: `DATABASE_MIN_CONNECTIONS`
    #[serde(default = "default_min_connections", alias = "DATABASE_MIN_CONNECTIONS")]
    pub database_min_connections: u32,
    /// Database connection acquire timeout in seconds.
    ///
    /// Environment variable: `DATABASE_CONNECTION_TIMEOUT`
    #[serde(default = "default_acquire_timeout", alias = "DATABASE_CONNECTION_TIMEOUT")]
    pub database_connection_timeout: u64,
    /// Database connection idle timeout in seconds.
    ///
    /// Environment variable: `DATABASE_IDLE_TIMEOUT`
    #[serde(default = "default_idle_timeout", alias = "DATABASE_IDLE_TIMEOUT")]
    pub database_idle_timeout: u64,
    /// Maximum lifetime of database connections in seconds.
    ///
    /// Environment variable: `DATABASE_MAX_LIFETIME`
    #[serde(default = "default_max_lifetime", alias = "DATABASE_MAX_LIFETIME")]
    pub database_max_lifetime: u64,

    // Key-value store
    /// Redis host name.
    ///
    /// Environment variable: `REDIS_HOST_NAME`
    #[serde(default = "default_redis_host", alias = "REDIS_HOST_NAME")]
    pub redis_host_name: String,
    /// Redis port.
    ///
    /// Environment variable: `REDIS_PORT_NUMBER`
    #[serde(default = "default_redis_port", alias = "REDIS_PORT_NUMBER")]
    pub redis_port_number: u16,

    // Server
    /// Server bind address.
    ///
    /// Environment variable: `HOST`
    #[serde(default = "default_host", alias = "HOST")]
    pub host: String,
    /// Server bind port.
    ///
    /// Environment variable: `PORT`
    #[serde(default = "default_port", alias = "PORT")]
    pub port: u16,
    /// HTTP request timeout in seconds.
    ///
    /// Environment variable: `REQUEST_TIMEOUT`
    #[serde(default = "default_request_timeout", alias = "REQUEST_TIMEOUT")]
    pub request_timeout: u64,
    /// Largest accepted request body in bytes.
    ///
    /// Environment variable: `MAX_BODY_BYTES`
    #[serde(default = "default_max_body_bytes", alias = "MAX_BODY_BYTES")]
    pub max_body_bytes: usize,

    // Ingestion
    /// Deadline for one audit log append, in milliseconds.
    ///
    /// Environment variable: `AUDIT_WRITE_TIMEOUT_MS`
    #[serde(default = "default_store_timeout_ms", alias = "AUDIT_WRITE_TIMEOUT_MS")]
    pub audit_write_timeout_ms: u64,
    /// Deadline for one queue push, in milliseconds.
    ///
    /// Environment variable: `ENQUEUE_TIMEOUT_MS`
    #[serde(default = "default_store_timeout_ms", alias = "ENQUEUE_TIMEOUT_MS")]
    pub enqueue_timeout_ms: u64,

    // Logging
    /// `tracing` filter directives, in `EnvFilter` syntax.
    ///
    /// Environment variable: `RUST_LOG`
    #[serde(default = "default_log_level", alias = "RUST_LOG")]
    pub rust_log: String,
}

impl Config {
    /// Load configuration from defaults, config file, and environment variable
    /// overrides.
    ///
    /// # Errors
    ///
    /// Fails if a source cannot be parsed or the merged values are invalid.
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(""));

        let config: Self = figment.extract().context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Store deadlines for the ingestion path.
    pub fn to_ingest_config(&self) -> IngestConfig {
        IngestConfig {
            audit_timeout: Duration::from_millis(self.audit_write_timeout_ms),
            enqueue_timeout: Duration::from_millis(self.enqueue_timeout_ms),
        }
    }

    /// Request deadline and body limit.
    pub fn to_http_limits(&self) -> HttpLimits {
        HttpLimits {
            request_timeout: Duration::from_secs(self.request_timeout),
            max_body_bytes: self.max_body_bytes,
        }
    }

    /// Filter directives for the tracing subscriber.
    pub fn log_filter(&self) -> &str {
        match self.rust_log.trim() {
            "" => DEFAULT_LOG_FILTER,
            directives => directives,
        }
    }

    /// Redis connection URL built from host and port.
    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}/", self.redis_host_name, self.redis_port_number)
    }

    /// Parse server socket address from host and port configuration.
    pub fn parse_server_addr(&self) -> Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.host, self.port);
        SocketAddr::from_str(&addr_str).context("Invalid server address")
    }

    /// Get database URL with password masked for logging.
    pub fn database_url_masked(&self) -> String {
        if let Some(at_pos) = self.database_url.rfind('@') {
            let scheme_end = self.database_url.find("://").map_or(0, |pos| pos + 3);
            if let Some(colon_pos) = self.database_url[scheme_end..at_pos].rfind(':') {
                let mut masked = self.database_url.clone();
                masked.replace_range(scheme_end + colon_pos + 1..at_pos, "***");
                return masked;
            }
        }
        self.database_url.clone()
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("port must be greater than 0");
        }

        if self.database_max_connections == 0 {
            anyhow::bail!("database max_connections must be greater than 0");
        }

        if self.database_min_connections > self.database_max_connections {
            anyhow::bail!("database min_connections cannot exceed max_connections");
        }

        if self.redis_host_name.trim().is_empty() {
            anyhow::bail!("redis_host_name must not be empty");
        }

        if self.audit_write_timeout_ms == 0 || self.enqueue_timeout_ms == 0 {
            anyhow::bail!("store timeouts must be greater than 0");
        }

        if self.max_body_bytes == 0 {
            anyhow::bail!("max_body_bytes must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            database_max_connections: default_max_connections(),
            database_min_connections: default_min_connections(),
            database_connection_timeout: default_acquire_timeout(),
            database_idle_timeout: default_idle_timeout(),
            database_max_lifetime: default_max_lifetime(),
            redis_host_name: default_redis_host(),
            redis_port_number: default_redis_port(),
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
            max_body_bytes: default_max_body_bytes(),
            audit_write_timeout_ms: default_store_timeout_ms(),
            enqueue_timeout_ms: default_store_timeout_ms(),
            rust_log: default_log_level(),
        }
    }
}

fn default_database_url() -> String {
    "postgresql://postgres@postgres:5432/ostrich".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_acquire_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    600
}

fn default_max_lifetime() -> u64 {
    1800
}

fn default_redis_host() -> String {
    "redis".to_string()
}

fn default_redis_port() -> u16 {
    6379
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_store_timeout_ms() -> u64 {
    5000
}

fn default_log_level() -> String {
    DEFAULT_LOG_FILTER.to_string()
}
