//! Row builders for routing unit tests.

use crate::domain::{
    DomainRef, ExitNodeId, MaintenanceSettings, PathRewrite, Resource, ResourceId, RouteRow, Site,
    SiteId, SiteType, Target, TargetId, TransportProtocol,
};

pub(crate) fn local_site(site_id: i64, online: bool) -> Site {
    Site {
        site_id: SiteId::new(site_id),
        site_type: SiteType::Local,
        online,
        subnet: None,
        exit_node_id: None,
    }
}

pub(crate) fn newt_site(site_id: i64, online: bool, subnet: Option<&str>) -> Site {
    Site {
        site_id: SiteId::new(site_id),
        site_type: SiteType::Newt,
        online,
        subnet: subnet.map(str::to_string),
        exit_node_id: Some(ExitNodeId::new(1)),
    }
}

pub(crate) fn target(target_id: i64, resource_id: i64) -> Target {
    Target {
        target_id: TargetId::new(target_id),
        resource_id: ResourceId::new(resource_id),
        site_id: SiteId::new(1),
        enabled: true,
        ip: Some("10.0.0.5".to_string()),
        method: Some("http".to_string()),
        port: Some(8080),
        internal_port: None,
        health: None,
        path: PathRewrite::default(),
        priority: None,
    }
}

/// SSL-enabled HTTP resource `app` on `example.com` with one local target.
pub(crate) fn http_row(resource_id: i64, target_id: i64, site: Site) -> RouteRow {
    let mut target = target(target_id, resource_id);
    target.site_id = site.site_id;

    RouteRow {
        resource: Resource {
            resource_id: ResourceId::new(resource_id),
            name: "app".to_string(),
            full_domain: Some("example.com".to_string()),
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
        },
        target,
        site,
    }
}
