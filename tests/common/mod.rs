//! Common test utilities for all integration tests.
//!
//! Row builders for synthesis tests and an in-memory SQLite database with the
//! schema applied.

#![allow(dead_code)]
#![allow(clippy::duplicate_mod)]

pub mod test_db;

use edgeplane::domain::{
    DomainRef, ExitNodeId, MaintenanceMode, MaintenanceSettings, PathMatchType, PathRewrite,
    Resource, ResourceId, RouteRow, Site, SiteId, SiteType, Target, TargetId, TransportProtocol,
};

pub fn local_site(site_id: i64, online: bool) -> Site {
    Site {
        site_id: SiteId::new(site_id),
        site_type: SiteType::Local,
        online,
        subnet: None,
        exit_node_id: None,
    }
}

pub fn newt_site(site_id: i64, online: bool, subnet: &str) -> Site {
    Site {
        site_id: SiteId::new(site_id),
        site_type: SiteType::Newt,
        online,
        subnet: Some(subnet.to_string()),
        exit_node_id: Some(ExitNodeId::new(1)),
    }
}

pub fn resource(resource_id: i64, name: &str, full_domain: &str) -> Resource {
    Resource {
        resource_id: ResourceId::new(resource_id),
        name: name.to_string(),
        full_domain: Some(full_domain.to_string()),
        subdomain: None,
        domain: Some(DomainRef {
            domain_id: "example".to_string(),
            cert_resolver: None,
            namespace: false,
        }),
        http: true,
        ssl: true,
        protocol: TransportProtocol::Tcp,
        proxy_port: None,
        enabled: true,
        sticky_session: false,
        tls_server_name: None,
        set_host_header: None,
        headers: None,
        proxy_protocol: false,
        proxy_protocol_version: None,
        prefer_wildcard_cert: None,
        maintenance: MaintenanceSettings::default(),
    }
}

pub fn target(target_id: i64, resource_id: i64, site: &Site, ip: &str, port: u16) -> Target {
    Target {
        target_id: TargetId::new(target_id),
        resource_id: ResourceId::new(resource_id),
        site_id: site.site_id,
        enabled: true,
        ip: Some(ip.to_string()),
        method: Some("http".to_string()),
        port: Some(port),
        internal_port: None,
        health: None,
        path: PathRewrite::default(),
        priority: None,
    }
}

pub fn row(resource: &Resource, target: Target, site: &Site) -> RouteRow {
    RouteRow { resource: resource.clone(), target, site: site.clone() }
}

/// `app` on `example.com`, SSL on, one local target at 10.0.0.5:8080.
pub fn example_row() -> RouteRow {
    let site = local_site(1, true);
    let resource = resource(1, "app", "example.com");
    let target = target(1, 1, &site, "10.0.0.5", 8080);
    row(&resource, target, &site)
}

pub fn with_path(mut row: RouteRow, path: &str, match_type: PathMatchType) -> RouteRow {
    row.target.path = PathRewrite::new(Some(path.to_string()), Some(match_type), None, None);
    row
}

pub fn with_maintenance(mut row: RouteRow, mode: MaintenanceMode) -> RouteRow {
    row.resource.maintenance.enabled = true;
    row.resource.maintenance.mode = mode;
    row
}
