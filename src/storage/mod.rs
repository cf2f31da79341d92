//! # Storage and Persistence
//!
//! SQLite connectivity, schema migrations and the snapshot readers feeding
//! route synthesis.

pub mod maintenance_page;
pub mod migrations;
pub mod pool;
pub mod repositories;
pub mod snapshot;

pub use crate::config::DatabaseConfig;

pub use maintenance_page::{MaintenancePage, MaintenancePageSource};
pub use migrations::{list_applied_migrations, validate_migrations, MigrationInfo};
pub use pool::{create_pool, get_pool_stats, DbPool, PoolStats};
pub use repositories::{ResourceRepository, SqliteSnapshotReader};
pub use snapshot::{SnapshotQuery, SnapshotReader, StaticSnapshotReader};

use crate::errors::{EdgeplaneError, Result};

/// Run database migrations
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    migrations::run_migrations(pool).await
}

/// Check database connectivity
pub async fn check_connection(pool: &DbPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .fetch_one(pool)
        .await
        .map_err(|e| EdgeplaneError::database(e, "Database connectivity check failed"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_sqlite_pool_and_migrate() {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            auto_migrate: false,
            ..Default::default()
        };

        let pool = create_pool(&config).await.unwrap();
        check_connection(&pool).await.unwrap();

        run_migrations(&pool).await.unwrap();
        assert!(validate_migrations(&pool).await.unwrap());

        // Second run is a no-op
        run_migrations(&pool).await.unwrap();
        assert_eq!(list_applied_migrations(&pool).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_database_url() {
        let config = DatabaseConfig { url: "invalid://url".to_string(), ..Default::default() };
        assert!(create_pool(&config).await.is_err());
    }
}
