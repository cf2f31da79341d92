//! Document assembly.
//!
//! [`ConfigSynthesizer`] turns one snapshot into one [`RoutingDocument`]. Each
//! route group is handled independently; a group that cannot be emitted is
//! skipped and the rest of the document is still produced.

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, Instrument};

use super::availability::eligible_targets;
use super::backend::{http_service, servers_transport, stream_service};
use super::document::{HttpRouter, RoutingDocument, StreamRouter};
use super::endpoint::Transport;
use super::group::{aggregate, sanitize, HttpRoute, RawRoute, RouteGroup, RouteKind};
use super::maintenance::{decide, write_maintenance_route};
use super::middleware::{build_chain, shared_middlewares, RewriteMiddlewareGenerator, StandardRewriteGenerator};
use super::rule::{build_rule, compute_priority};
use super::tls::resolve_tls;
use crate::config::RoutingConfig;
use crate::domain::{RouteRow, TransportProtocol};
use crate::errors::Result;
use crate::observability::metrics::{DropReason, MetricsRecorder};
use crate::storage::{SnapshotQuery, SnapshotReader};

/// Entry points of a group's main router.
pub(crate) fn main_entry_points(ssl: bool, settings: &RoutingConfig) -> Vec<String> {
    if ssl {
        vec![settings.https_entrypoint.clone()]
    } else {
        vec![settings.http_entrypoint.clone()]
    }
}

/// Plain-HTTP twin of a TLS router that only redirects to https.
pub(crate) fn redirect_twin(router: &HttpRouter, settings: &RoutingConfig) -> HttpRouter {
    HttpRouter {
        entry_points: vec![settings.http_entrypoint.clone()],
        rule: router.rule.clone(),
        service: router.service.clone(),
        middlewares: vec![settings.redirect_middleware_name.clone()],
        priority: router.priority,
        tls: None,
    }
}

/// Key fragment for a resource name; names with no usable characters become `resource`.
fn name_fragment(name: &str) -> String {
    let fragment = sanitize(name);
    if fragment.is_empty() {
        "resource".to_string()
    } else {
        fragment
    }
}

/// Builds routing documents from snapshot rows.
#[derive(Clone)]
pub struct ConfigSynthesizer {
    settings: RoutingConfig,
    rewrites: Arc<dyn RewriteMiddlewareGenerator>,
    metrics: MetricsRecorder,
}

impl std::fmt::Debug for ConfigSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigSynthesizer").field("settings", &self.settings).finish_non_exhaustive()
    }
}

impl ConfigSynthesizer {
    pub fn new(settings: RoutingConfig) -> Self {
        Self {
            settings,
            rewrites: Arc::new(StandardRewriteGenerator),
            metrics: MetricsRecorder::new(),
        }
    }

    /// Replace the path rewrite middleware generator.
    pub fn with_rewrite_generator(mut self, rewrites: Arc<dyn RewriteMiddlewareGenerator>) -> Self {
        self.rewrites = rewrites;
        self
    }

    pub fn settings(&self) -> &RoutingConfig {
        &self.settings
    }

    /// Read a snapshot for the query and synthesize its document.
    ///
    /// A failed read is returned to the caller; nothing is retried here.
    pub async fn generate(
        &self,
        reader: &dyn SnapshotReader,
        query: &SnapshotQuery,
    ) -> Result<RoutingDocument> {
        let exit_node_id = query.exit_node_id.get();
        let span = crate::synth_span!(query.exit_node_id);

        async move {
            let started = Instant::now();

            let rows = match reader.read_rows(query).await {
                Ok(rows) => rows,
                Err(e) => {
                    error!(error = %e, "Failed to read routing snapshot");
                    self.metrics.record_synthesis(
                        exit_node_id,
                        started.elapsed().as_secs_f64(),
                        false,
                    );
                    return Err(e);
                }
            };

            let row_count = rows.len();
            let (document, groups) = self.assemble(rows);

            self.metrics.record_synthesis(exit_node_id, started.elapsed().as_secs_f64(), true);
            self.metrics.record_document(exit_node_id, groups, document.router_count());
            info!(
                rows = row_count,
                groups,
                routers = document.router_count(),
                "Synthesized routing document"
            );

            Ok(document)
        }
        .instrument(span)
        .await
    }

    /// Synthesize a document from rows already read.
    pub fn synthesize(&self, rows: Vec<RouteRow>) -> RoutingDocument {
        self.assemble(rows).0
    }

    fn assemble(&self, rows: Vec<RouteRow>) -> (RoutingDocument, usize) {
        let aggregation = aggregate(rows);
        for _ in &aggregation.invalid {
            self.metrics.record_dropped_group(DropReason::InvalidPath);
        }

        let mut document = RoutingDocument::default();
        for group in &aggregation.groups {
            if !group.resource.enabled {
                debug!(group_key = %group.slug, "Skipping disabled resource");
                continue;
            }

            match group.route_kind() {
                Some(RouteKind::Http(route)) => self.write_http(&mut document, group, &route),
                Some(RouteKind::Raw(route)) => self.write_raw(&mut document, group, route),
                None => {
                    debug!(
                        resource_id = %group.resource.resource_id,
                        group_key = %group.slug,
                        "Skipping route group missing domain or proxy port"
                    );
                    self.metrics.record_dropped_group(DropReason::Incomplete);
                }
            }
        }

        if let Some(http) = document.http.as_mut() {
            for (name, middleware) in shared_middlewares(&self.settings) {
                http.middlewares.entry(name).or_insert(middleware);
            }
        }

        (document, aggregation.groups.len())
    }

    fn write_http(&self, document: &mut RoutingDocument, group: &RouteGroup, route: &HttpRoute) {
        let settings = &self.settings;
        let resource = &group.resource;
        let eligible = eligible_targets(&group.targets, Transport::Http);
        let tls = resource.ssl.then(|| resolve_tls(resource, &route.full_domain, settings));
        let http = document.http_mut();

        let decision = decide(&resource.maintenance, eligible.len());
        if decision.shows_page() {
            info!(
                resource_id = %resource.resource_id,
                group_key = %group.slug,
                decision = ?decision,
                "Routing group to maintenance page"
            );
            write_maintenance_route(http, group, route, tls, settings);
            return;
        }

        let name = name_fragment(&resource.name);
        let router_name = format!("{}-{}-router", group.slug, name);
        let service_name = format!("{}-{}-service", group.slug, name);

        let transport_name = servers_transport(resource).map(|transport| {
            let transport_name = format!("{}-transport", group.slug);
            http.servers_transports.insert(transport_name.clone(), transport);
            transport_name
        });

        let chain = build_chain(group, settings, self.rewrites.as_ref());
        http.middlewares.extend(chain.definitions);

        http.services.insert(
            service_name.clone(),
            http_service(resource, &eligible, transport_name.as_deref(), settings),
        );

        let router = HttpRouter {
            entry_points: main_entry_points(resource.ssl, settings),
            rule: build_rule(&route.full_domain, &group.key.path),
            service: service_name,
            middlewares: chain.names,
            priority: compute_priority(group.priority_override(), &group.key.path),
            tls,
        };

        if resource.ssl {
            http.routers.insert(format!("{}-redirect", router_name), redirect_twin(&router, settings));
        }
        http.routers.insert(router_name, router);
    }

    fn write_raw(&self, document: &mut RoutingDocument, group: &RouteGroup, route: RawRoute) {
        let resource = &group.resource;
        if resource.maintenance.enabled {
            debug!(
                resource_id = %resource.resource_id,
                "Maintenance mode has no effect on raw resources"
            );
        }

        let eligible = eligible_targets(&group.targets, Transport::Stream);
        let name = name_fragment(&resource.name);
        let router_name = format!("{}-{}-router", group.slug, name);
        let service_name = format!("{}-{}-service", group.slug, name);

        let service = stream_service(resource, route.protocol, &eligible, &self.settings);
        let router = StreamRouter {
            entry_points: vec![format!("{}-{}", route.protocol, route.port)],
            service: service_name.clone(),
            rule: (route.protocol == TransportProtocol::Tcp).then(|| "HostSNI(`*`)".to_string()),
        };

        let stream = document.stream_mut(route.protocol);
        stream.services.insert(service_name, service);
        stream.routers.insert(router_name, router);
    }
}
