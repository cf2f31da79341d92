//! Lookup of maintenance-page content by host name.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// What the maintenance page shows for one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenancePage {
    pub resource_name: String,
    pub title: Option<String>,
    pub message: Option<String>,
    pub estimated_time: Option<String>,
}

/// Resolves the resource served on a host to its maintenance-page content.
#[async_trait]
pub trait MaintenancePageSource: Send + Sync {
    async fn maintenance_page(&self, host: &str) -> Result<Option<MaintenancePage>>;
}
