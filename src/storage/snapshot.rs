//! Snapshot readers
//!
//! A snapshot is the denormalized row set one synthesis call works on. Readers
//! are the only I/O in the synthesis path.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::maintenance_page::{MaintenancePage, MaintenancePageSource};
use crate::domain::{ExitNodeId, RouteRow, SiteType};
use crate::errors::{EdgeplaneError, Result};

/// Which rows a caller wants for one exit node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotQuery {
    pub exit_node_id: ExitNodeId,
    pub site_types: Vec<SiteType>,
    /// Leave out resources on shared namespace domains
    pub filter_namespace_domains: bool,
    /// Include TCP/UDP resources; when false only HTTP resources are returned
    pub allow_raw_resources: bool,
}

impl SnapshotQuery {
    pub fn new(exit_node_id: ExitNodeId) -> Self {
        Self {
            exit_node_id,
            site_types: SiteType::ALL.to_vec(),
            filter_namespace_domains: false,
            allow_raw_resources: true,
        }
    }

    pub fn wants_site_type(&self, site_type: SiteType) -> bool {
        self.site_types.contains(&site_type)
    }

    /// Whether a row belongs in this query's snapshot.
    pub fn admits(&self, row: &RouteRow) -> bool {
        let site = &row.site;

        let on_exit_node = match site.exit_node_id {
            Some(exit_node_id) => exit_node_id == self.exit_node_id,
            None => site.site_type == SiteType::Local,
        };

        let namespace_excluded = self.filter_namespace_domains
            && row.resource.domain.as_ref().is_some_and(|d| d.namespace);

        row.target.enabled
            && row.resource.enabled
            && on_exit_node
            && self.wants_site_type(site.site_type)
            && !row.target.is_unhealthy()
            && (self.allow_raw_resources || row.resource.http)
            && !namespace_excluded
    }
}

/// Source of snapshot rows.
///
/// Rows come back ordered by descending target priority, then ascending
/// target id.
#[async_trait]
pub trait SnapshotReader: Send + Sync {
    async fn read_rows(&self, query: &SnapshotQuery) -> Result<Vec<RouteRow>>;
}

/// In-memory reader over a fixed row set.
#[derive(Debug, Clone, Default)]
pub struct StaticSnapshotReader {
    rows: Vec<RouteRow>,
}

impl StaticSnapshotReader {
    pub fn new(rows: Vec<RouteRow>) -> Self {
        Self { rows }
    }

    /// Load rows from a JSON array of [`RouteRow`]s.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let rows = serde_json::from_str(&content).map_err(|e| EdgeplaneError::Serialization {
            source: e,
            context: format!("Failed to parse snapshot fixture {}", path.display()),
        })?;
        Ok(Self::new(rows))
    }
}

#[async_trait]
impl SnapshotReader for StaticSnapshotReader {
    async fn read_rows(&self, query: &SnapshotQuery) -> Result<Vec<RouteRow>> {
        Ok(self.rows.iter().filter(|row| query.admits(row)).cloned().collect())
    }
}

#[async_trait]
impl MaintenancePageSource for StaticSnapshotReader {
    async fn maintenance_page(&self, host: &str) -> Result<Option<MaintenancePage>> {
        Ok(self
            .rows
            .iter()
            .map(|row| &row.resource)
            .find(|resource| resource.http && resource.full_domain.as_deref() == Some(host))
            .map(|resource| MaintenancePage {
                resource_name: resource.name.clone(),
                title: resource.maintenance.title.clone(),
                message: resource.maintenance.message.clone(),
                estimated_time: resource.maintenance.estimated_time.clone(),
            }))
    }
}
