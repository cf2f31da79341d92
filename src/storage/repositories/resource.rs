//! Resource Repository
//!
//! Point lookups on resources outside the bulk snapshot path.

use async_trait::async_trait;
use sqlx::FromRow;
use tracing::instrument;

use crate::errors::{EdgeplaneError, Result};
use crate::storage::maintenance_page::{MaintenancePage, MaintenancePageSource};
use crate::storage::DbPool;

#[derive(Debug, Clone, FromRow)]
struct MaintenancePageRow {
    name: String,
    maintenance_title: Option<String>,
    maintenance_message: Option<String>,
    maintenance_estimated_time: Option<String>,
}

impl From<MaintenancePageRow> for MaintenancePage {
    fn from(row: MaintenancePageRow) -> Self {
        Self {
            resource_name: row.name,
            title: row.maintenance_title,
            message: row.maintenance_message,
            estimated_time: row.maintenance_estimated_time,
        }
    }
}

/// Repository for resource lookups.
#[derive(Debug, Clone)]
pub struct ResourceRepository {
    pool: DbPool,
}

impl ResourceRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl MaintenancePageSource for ResourceRepository {
    #[instrument(skip(self), name = "db_find_maintenance_page")]
    async fn maintenance_page(&self, host: &str) -> Result<Option<MaintenancePage>> {
        let row = sqlx::query_as::<_, MaintenancePageRow>(
            "SELECT name, maintenance_title, maintenance_message, maintenance_estimated_time \
             FROM resources WHERE full_domain = ?1 AND http = 1 ORDER BY resource_id LIMIT 1",
        )
        .bind(host)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            EdgeplaneError::database(e, format!("Failed to look up resource for host '{}'", host))
        })?;

        Ok(row.map(MaintenancePage::from))
    }
}
