//! Maintenance-page routing.
//!
//! Decided before any normal routing for an HTTP group. A maintenance route
//! sends every request on the host to the maintenance page server.

use super::assembler::{main_entry_points, redirect_twin};
use super::document::{
    HttpConfig, HttpLoadBalancer, HttpRouter, HttpServer, HttpService, Middleware,
    ReplacePathRegex, TlsBlock,
};
use super::group::{HttpRoute, RouteGroup};
use super::rule::{host_rule, MAINTENANCE_PRIORITY};
use crate::config::RoutingConfig;
use crate::domain::{MaintenanceMode, MaintenanceSettings};

/// Outcome of the maintenance state machine for one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceDecision {
    /// Route normally
    Normal,
    /// Maintenance forced by the operator
    Forced,
    /// Automatic maintenance: no eligible backend
    NoEligibleTargets,
}

impl MaintenanceDecision {
    pub fn shows_page(&self) -> bool {
        !matches!(self, MaintenanceDecision::Normal)
    }
}

pub fn decide(settings: &MaintenanceSettings, eligible_targets: usize) -> MaintenanceDecision {
    if !settings.enabled {
        return MaintenanceDecision::Normal;
    }
    match settings.mode {
        MaintenanceMode::Forced => MaintenanceDecision::Forced,
        MaintenanceMode::Automatic if eligible_targets == 0 => MaintenanceDecision::NoEligibleTargets,
        MaintenanceMode::Automatic => MaintenanceDecision::Normal,
    }
}

/// Write the maintenance router, service and rewrite for a group.
pub fn write_maintenance_route(
    http: &mut HttpConfig,
    group: &RouteGroup,
    route: &HttpRoute,
    tls: Option<TlsBlock>,
    settings: &RoutingConfig,
) {
    let router_name = format!("{}-maintenance-router", group.slug);
    let service_name = format!("{}-maintenance-service", group.slug);
    let rewrite_name = format!("{}-maintenance-rewrite", group.slug);

    http.middlewares.insert(
        rewrite_name.clone(),
        Middleware::ReplacePathRegex(ReplacePathRegex {
            regex: "^/(.*)".to_string(),
            replacement: settings.maintenance_path.clone(),
        }),
    );

    http.services.insert(
        service_name.clone(),
        HttpService {
            load_balancer: HttpLoadBalancer {
                servers: vec![HttpServer { url: settings.maintenance_url() }],
                sticky: None,
                servers_transport: None,
                pass_host_header: Some(true),
            },
        },
    );

    let router = HttpRouter {
        entry_points: main_entry_points(group.resource.ssl, settings),
        rule: host_rule(&route.full_domain),
        service: service_name,
        middlewares: vec![rewrite_name],
        priority: MAINTENANCE_PRIORITY,
        tls,
    };

    if group.resource.ssl {
        http.routers.insert(format!("{}-redirect", router_name), redirect_twin(&router, settings));
    }
    http.routers.insert(router_name, router);
}
