//! Route Snapshot Repository
//!
//! The SQLite [`SnapshotReader`]: one bulk join over resources, targets,
//! sites, health checks and domains per synthesis call.

use async_trait::async_trait;
use sqlx::{FromRow, QueryBuilder, Sqlite};
use tracing::{instrument, Instrument};

use crate::domain::{
    DomainRef, ExitNodeId, MaintenanceMode, MaintenanceSettings, PathMatchType, PathRewrite,
    Resource, ResourceId, RewritePathType, RouteRow, Site, SiteId, SiteType, Target, TargetHealth,
    TargetId, TransportProtocol,
};
use crate::errors::{EdgeplaneError, Result};
use crate::observability::metrics::{DropReason, MetricsRecorder};
use crate::storage::snapshot::{SnapshotQuery, SnapshotReader};
use crate::storage::DbPool;

const SNAPSHOT_SELECT: &str = r#"
SELECT
    r.resource_id, r.name, r.full_domain, r.subdomain, r.domain_id, r.http, r.ssl,
    r.protocol, r.proxy_port, r.enabled AS resource_enabled, r.sticky_session,
    r.tls_server_name, r.set_host_header, r.headers, r.proxy_protocol,
    r.proxy_protocol_version, r.prefer_wildcard_cert, r.maintenance_mode_enabled,
    r.maintenance_mode_type, r.maintenance_title, r.maintenance_message,
    r.maintenance_estimated_time,
    d.cert_resolver, d.namespace AS domain_namespace,
    t.target_id, t.enabled AS target_enabled, t.ip, t.method, t.port, t.internal_port,
    t.path, t.path_match_type, t.rewrite_path, t.rewrite_path_type, t.priority,
    h.hc_health,
    s.site_id, s.type AS site_type, s.online, s.subnet, s.exit_node_id
FROM targets t
JOIN resources r ON r.resource_id = t.resource_id
JOIN sites s ON s.site_id = t.site_id
LEFT JOIN target_health_checks h ON h.target_id = t.target_id
LEFT JOIN domains d ON d.domain_id = r.domain_id
WHERE t.enabled = 1
  AND r.enabled = 1
  AND r.http IS NOT NULL
  AND (h.hc_health IS NULL OR h.hc_health <> 'unhealthy')
"#;

/// Internal database row structure for the snapshot join.
#[derive(Debug, Clone, FromRow)]
struct SnapshotRow {
    resource_id: i64,
    name: String,
    full_domain: Option<String>,
    subdomain: Option<String>,
    domain_id: Option<String>,
    http: bool,
    ssl: bool,
    protocol: String,
    proxy_port: Option<i64>,
    resource_enabled: bool,
    sticky_session: bool,
    tls_server_name: Option<String>,
    set_host_header: Option<String>,
    headers: Option<String>,
    proxy_protocol: bool,
    proxy_protocol_version: Option<i64>,
    prefer_wildcard_cert: Option<bool>,
    maintenance_mode_enabled: bool,
    maintenance_mode_type: String,
    maintenance_title: Option<String>,
    maintenance_message: Option<String>,
    maintenance_estimated_time: Option<String>,
    cert_resolver: Option<String>,
    domain_namespace: Option<bool>,
    target_id: i64,
    target_enabled: bool,
    ip: Option<String>,
    method: Option<String>,
    port: Option<i64>,
    internal_port: Option<i64>,
    path: Option<String>,
    path_match_type: Option<String>,
    rewrite_path: Option<String>,
    rewrite_path_type: Option<String>,
    priority: Option<i64>,
    hc_health: Option<String>,
    site_id: i64,
    site_type: String,
    online: bool,
    subnet: Option<String>,
    exit_node_id: Option<i64>,
}

fn parse<T: std::str::FromStr<Err = String>>(value: &str) -> Result<T> {
    value.parse().map_err(|e: String| EdgeplaneError::internal(format!("Failed to parse snapshot row: {}", e)))
}

fn parse_opt<T: std::str::FromStr<Err = String>>(value: Option<&str>) -> Result<Option<T>> {
    value.filter(|v| !v.is_empty()).map(parse::<T>).transpose()
}

fn port(value: Option<i64>) -> Option<u16> {
    value.and_then(|p| u16::try_from(p).ok())
}

impl TryFrom<SnapshotRow> for RouteRow {
    type Error = EdgeplaneError;

    fn try_from(row: SnapshotRow) -> Result<Self> {
        let resource_id = ResourceId::new(row.resource_id);
        let site_id = SiteId::new(row.site_id);

        let domain = row.domain_id.map(|domain_id| DomainRef {
            domain_id,
            cert_resolver: row.cert_resolver,
            namespace: row.domain_namespace.unwrap_or(false),
        });

        let resource = Resource {
            resource_id,
            name: row.name,
            full_domain: row.full_domain,
            subdomain: row.subdomain,
            domain,
            http: row.http,
            ssl: row.ssl,
            protocol: parse::<TransportProtocol>(&row.protocol)?,
            proxy_port: port(row.proxy_port),
            enabled: row.resource_enabled,
            sticky_session: row.sticky_session,
            tls_server_name: row.tls_server_name,
            set_host_header: row.set_host_header,
            headers: row.headers,
            proxy_protocol: row.proxy_protocol,
            proxy_protocol_version: row.proxy_protocol_version.and_then(|v| u8::try_from(v).ok()),
            prefer_wildcard_cert: row.prefer_wildcard_cert,
            maintenance: MaintenanceSettings {
                enabled: row.maintenance_mode_enabled,
                mode: parse::<MaintenanceMode>(&row.maintenance_mode_type)?,
                title: row.maintenance_title,
                message: row.maintenance_message,
                estimated_time: row.maintenance_estimated_time,
            },
        };

        let target = Target {
            target_id: TargetId::new(row.target_id),
            resource_id,
            site_id,
            enabled: row.target_enabled,
            ip: row.ip,
            method: row.method,
            port: port(row.port),
            internal_port: port(row.internal_port),
            health: parse_opt::<TargetHealth>(row.hc_health.as_deref())?,
            path: PathRewrite::new(
                row.path,
                parse_opt::<PathMatchType>(row.path_match_type.as_deref())?,
                row.rewrite_path,
                parse_opt::<RewritePathType>(row.rewrite_path_type.as_deref())?,
            ),
            priority: row.priority.and_then(|p| i32::try_from(p).ok()),
        };

        let site = Site {
            site_id,
            site_type: parse::<SiteType>(&row.site_type)?,
            online: row.online,
            subnet: row.subnet,
            exit_node_id: row.exit_node_id.map(ExitNodeId::new),
        };

        Ok(RouteRow { resource, target, site })
    }
}

/// Reads routing snapshots from SQLite.
#[derive(Debug, Clone)]
pub struct SqliteSnapshotReader {
    pool: DbPool,
}

impl SqliteSnapshotReader {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn build_query<'q>(query: &'q SnapshotQuery) -> QueryBuilder<'q, Sqlite> {
        let mut builder = QueryBuilder::<Sqlite>::new(SNAPSHOT_SELECT);

        builder.push(" AND (s.exit_node_id = ").push_bind(query.exit_node_id);
        if query.wants_site_type(SiteType::Local) {
            builder.push(" OR (s.exit_node_id IS NULL AND s.type = 'local')");
        }
        builder.push(")");

        builder.push(" AND s.type IN (");
        let mut site_types = builder.separated(", ");
        for site_type in &query.site_types {
            site_types.push_bind(site_type.as_str());
        }
        builder.push(")");

        if !query.allow_raw_resources {
            builder.push(" AND r.http = 1");
        }
        if query.filter_namespace_domains {
            builder.push(" AND (d.namespace IS NULL OR d.namespace = 0)");
        }

        builder.push(" ORDER BY t.priority DESC, t.target_id ASC");
        builder
    }
}

#[async_trait]
impl SnapshotReader for SqliteSnapshotReader {
    #[instrument(skip(self, query), fields(exit_node_id = %query.exit_node_id), name = "db_read_snapshot")]
    async fn read_rows(&self, query: &SnapshotQuery) -> Result<Vec<RouteRow>> {
        if query.site_types.is_empty() {
            return Ok(Vec::new());
        }

        let rows = Self::build_query(query)
            .build_query_as::<SnapshotRow>()
            .fetch_all(&self.pool)
            .instrument(crate::db_span!("read_snapshot"))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to read routing snapshot");
                EdgeplaneError::database(e, "Failed to read routing snapshot")
            })?;

        tracing::debug!(rows = rows.len(), "Read routing snapshot");

        let metrics = MetricsRecorder::new();
        let mut route_rows = Vec::with_capacity(rows.len());
        for row in rows {
            let (resource_id, target_id) = (row.resource_id, row.target_id);
            match RouteRow::try_from(row) {
                Ok(route_row) => route_rows.push(route_row),
                Err(e) => {
                    tracing::warn!(
                        resource_id,
                        target_id,
                        error = %e,
                        "Skipping unreadable snapshot row"
                    );
                    metrics.record_dropped_row(DropReason::MalformedRow);
                }
            }
        }
        Ok(route_rows)
    }
}
