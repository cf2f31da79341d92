//! # Database Connection Pool Management
//!
//! SQLite connection pool creation for the routing snapshot store.

use crate::config::DatabaseConfig;
use crate::errors::{EdgeplaneError, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Pool, Sqlite,
};
use std::{str::FromStr, time::Duration};

/// Type alias for the database connection pool
pub type DbPool = Pool<Sqlite>;

const SQLITE_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Create a database connection pool with the specified configuration
pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool> {
    validate_config(config)?;

    let pool_options = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.connect_timeout())
        .test_before_acquire(true);

    let pool_options = match config.idle_timeout() {
        Some(idle_timeout) => pool_options.idle_timeout(idle_timeout),
        None => pool_options,
    };

    let connect_options = SqliteConnectOptions::from_str(&config.url)
        .map_err(|e| {
            EdgeplaneError::database(e, format!("Invalid SQLite connection string: {}", config.url))
        })?
        .create_if_missing(true)
        .busy_timeout(SQLITE_BUSY_TIMEOUT)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = pool_options.connect_with(connect_options).await.map_err(|e| {
        tracing::error!(
            error = %e,
            url = %config.url,
            busy_timeout_ms = SQLITE_BUSY_TIMEOUT.as_millis(),
            "Failed to create SQLite database pool"
        );
        EdgeplaneError::database(e, format!("Failed to connect to database: {}", config.url))
    })?;

    tracing::info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        connect_timeout_ms = config.connect_timeout().as_millis(),
        idle_timeout_ms = config.idle_timeout().map(|d| d.as_millis()),
        "Database connection pool created"
    );

    if config.auto_migrate {
        tracing::info!("Auto-migration enabled, running database migrations");
        crate::storage::migrations::run_migrations(&pool).await?;
    }

    Ok(pool)
}

fn validate_config(config: &DatabaseConfig) -> Result<()> {
    if config.max_connections == 0 {
        return Err(EdgeplaneError::validation("max_connections must be greater than 0"));
    }

    if config.min_connections > config.max_connections {
        return Err(EdgeplaneError::validation(
            "min_connections cannot be greater than max_connections",
        ));
    }

    if config.url.is_empty() {
        return Err(EdgeplaneError::validation("database URL cannot be empty"));
    }

    if !config.is_sqlite() {
        return Err(EdgeplaneError::validation("database URL must start with 'sqlite:'"));
    }

    Ok(())
}

/// Get pool statistics for monitoring
pub fn get_pool_stats(pool: &DbPool) -> PoolStats {
    PoolStats { size: pool.size(), idle: pool.num_idle() }
}

/// Pool statistics for monitoring
#[derive(Debug, Clone)]
pub struct PoolStats {
    /// Total connections in the pool
    pub size: u32,
    /// Number of idle connections
    pub idle: usize,
}

impl PoolStats {
    pub fn active(&self) -> u32 {
        self.size.saturating_sub(self.idle as u32)
    }

    pub fn is_healthy(&self) -> bool {
        self.size > 0
    }
}
