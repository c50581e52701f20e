//! Database connection pool management
//!
//! This module provides connection pool configuration and creation for PostgreSQL
//! using SQLx, and applies the schema migrations under `migrations/`.

use serde::Deserialize;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, warn};

use crate::error::DatabaseError;

/// Type alias for the PostgreSQL connection pool
pub type DatabasePool = PgPool;

/// Configuration options for the database connection pool
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use infra_db::DatabaseConfig;
///
/// let config = DatabaseConfig::new("postgres://localhost/party")
///     .max_connections(20)
///     .min_connections(5)
///     .connect_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to maintain
    pub min_connections: u32,
    /// Connection timeout duration
    pub connect_timeout: Duration,
    /// Maximum lifetime of a connection
    pub max_lifetime: Duration,
    /// Idle timeout before closing a connection
    pub idle_timeout: Duration,
}

impl DatabaseConfig {
    /// Creates a configuration for `url` with default pool settings
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            min_connections: 2,
            connect_timeout: Duration::from_secs(30),
            max_lifetime: Duration::from_secs(30 * 60), // 30 minutes
            idle_timeout: Duration::from_secs(10 * 60), // 10 minutes
        }
    }

    /// Maximum pool size (default: 10)
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Connections kept open while idle (default: 2)
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// How long an acquire waits for a connection (default: 30s)
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn max_lifetime(mut self, lifetime: Duration) -> Self {
        self.max_lifetime = lifetime;
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::new("postgres://localhost/party")
    }
}

/// Environment representation of [`DatabaseConfig`], with durations in seconds
#[derive(Debug, Deserialize)]
struct DatabaseSettings {
    url: String,
    max_connections: Option<u32>,
    min_connections: Option<u32>,
    connect_timeout_secs: Option<u64>,
    max_lifetime_secs: Option<u64>,
    idle_timeout_secs: Option<u64>,
}

impl DatabaseConfig {
    /// Loads configuration from `DATABASE_*` environment variables
    ///
    /// `DATABASE_URL` is required; `DATABASE_MAX_CONNECTIONS`,
    /// `DATABASE_MIN_CONNECTIONS`, `DATABASE_CONNECT_TIMEOUT_SECS`,
    /// `DATABASE_MAX_LIFETIME_SECS` and `DATABASE_IDLE_TIMEOUT_SECS` override
    /// the defaults. A `.env` file is read first when present.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::ConnectionFailed` if the URL is missing or a
    /// value does not parse
    pub fn from_env() -> Result<Self, DatabaseError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                warn!("Ignoring unreadable .env file: {}", e);
            }
        }

        let settings: DatabaseSettings = config::Config::builder()
            .add_source(config::Environment::with_prefix("DATABASE").try_parsing(true))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| DatabaseError::ConnectionFailed(format!("Invalid database configuration: {}", e)))?;

        let mut config = Self::new(settings.url);
        if let Some(max) = settings.max_connections {
            config = config.max_connections(max);
        }
        if let Some(min) = settings.min_connections {
            config = config.min_connections(min);
        }
        if let Some(secs) = settings.connect_timeout_secs {
            config = config.connect_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = settings.max_lifetime_secs {
            config = config.max_lifetime(Duration::from_secs(secs));
        }
        if let Some(secs) = settings.idle_timeout_secs {
            config = config.idle_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

/// Creates a database connection pool with the given configuration
///
/// # Errors
///
/// Returns `DatabaseError::ConnectionFailed` if the pool cannot be created
///
/// # Example
///
/// ```rust,ignore
/// use infra_db::{DatabaseConfig, create_pool};
///
/// let config = DatabaseConfig::from_env()?;
/// let pool = create_pool(config).await?;
/// ```
pub async fn create_pool(config: DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Creating party database pool"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.connect_timeout)
        .max_lifetime(config.max_lifetime)
        .idle_timeout(config.idle_timeout)
        .connect(&config.url)
        .await
        .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

    info!("Party database pool ready");
    Ok(pool)
}

/// Creates a connection pool from a URL with default pool settings
pub async fn create_pool_from_url(url: &str) -> Result<DatabasePool, DatabaseError> {
    create_pool(DatabaseConfig::new(url)).await
}

/// Applies the party schema migrations
///
/// # Errors
///
/// Returns `DatabaseError::MigrationFailed` if a migration cannot be applied
pub async fn run_migrations(pool: &DatabasePool) -> Result<(), DatabaseError> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}
