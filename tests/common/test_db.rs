//! Test database utilities for integration tests.
//!
//! Each [`TestDatabase`] is a SQLite file inside its own temporary directory,
//! migrated on creation and removed on drop.

#![allow(clippy::duplicate_mod)]

use edgeplane::config::DatabaseConfig;
use edgeplane::storage::{create_pool, DbPool};
use tempfile::TempDir;

pub struct TestDatabase {
    pub pool: DbPool,
    _dir: TempDir,
}

impl TestDatabase {
    /// Create a migrated database.
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("create test database directory");
        let config = DatabaseConfig {
            url: format!("sqlite://{}", dir.path().join("edgeplane.db").display()),
            max_connections: 2,
            min_connections: 0,
            idle_timeout_seconds: 0,
            auto_migrate: true,
            ..Default::default()
        };

        let pool = create_pool(&config).await.expect("create test database pool");
        Self { pool, _dir: dir }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub async fn insert_site(
        &self,
        site_id: i64,
        site_type: &str,
        online: bool,
        subnet: Option<&str>,
        exit_node_id: Option<i64>,
    ) {
        sqlx::query(
            "INSERT INTO sites (site_id, name, type, online, subnet, exit_node_id) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(site_id)
        .bind(format!("site-{}", site_id))
        .bind(site_type)
        .bind(online)
        .bind(subnet)
        .bind(exit_node_id)
        .execute(&self.pool)
        .await
        .expect("insert site");
    }

    pub async fn insert_domain(&self, domain_id: &str, cert_resolver: Option<&str>, namespace: bool) {
        sqlx::query(
            "INSERT INTO domains (domain_id, base_domain, cert_resolver, namespace) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(domain_id)
        .bind(format!("{}.test", domain_id))
        .bind(cert_resolver)
        .bind(namespace)
        .execute(&self.pool)
        .await
        .expect("insert domain");
    }

    /// Insert an SSL HTTP resource on `full_domain`.
    pub async fn insert_http_resource(
        &self,
        resource_id: i64,
        name: &str,
        full_domain: &str,
        domain_id: &str,
    ) {
        sqlx::query(
            "INSERT INTO resources (resource_id, name, full_domain, domain_id, http, ssl) VALUES (?1, ?2, ?3, ?4, 1, 1)",
        )
        .bind(resource_id)
        .bind(name)
        .bind(full_domain)
        .bind(domain_id)
        .execute(&self.pool)
        .await
        .expect("insert http resource");
    }

    pub async fn insert_raw_resource(&self, resource_id: i64, name: &str, protocol: &str, port: i64) {
        sqlx::query(
            "INSERT INTO resources (resource_id, name, http, protocol, proxy_port) VALUES (?1, ?2, 0, ?3, ?4)",
        )
        .bind(resource_id)
        .bind(name)
        .bind(protocol)
        .bind(port)
        .execute(&self.pool)
        .await
        .expect("insert raw resource");
    }

    pub async fn insert_target(
        &self,
        target_id: i64,
        resource_id: i64,
        site_id: i64,
        ip: &str,
        port: i64,
        priority: Option<i64>,
    ) {
        sqlx::query(
            "INSERT INTO targets (target_id, resource_id, site_id, ip, method, port, priority) VALUES (?1, ?2, ?3, ?4, 'http', ?5, ?6)",
        )
        .bind(target_id)
        .bind(resource_id)
        .bind(site_id)
        .bind(ip)
        .bind(port)
        .bind(priority)
        .execute(&self.pool)
        .await
        .expect("insert target");
    }

    pub async fn set_health(&self, target_id: i64, health: &str) {
        sqlx::query("INSERT INTO target_health_checks (target_id, hc_health) VALUES (?1, ?2)")
            .bind(target_id)
            .bind(health)
            .execute(&self.pool)
            .await
            .expect("insert health check");
    }

    pub async fn execute(&self, sql: &str) {
        sqlx::query(sql).execute(&self.pool).await.expect("execute statement");
    }
}
