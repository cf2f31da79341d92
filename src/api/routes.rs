use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::domain::normalize_path;
use crate::routing::ConfigSynthesizer;
use crate::storage::{MaintenancePageSource, SnapshotReader};

use super::handlers::{get_routing_config_handler, health_handler, maintenance_page_handler};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct ApiState {
    pub synthesizer: Arc<ConfigSynthesizer>,
    pub snapshots: Arc<dyn SnapshotReader>,
    pub maintenance_pages: Arc<dyn MaintenancePageSource>,
}

impl ApiState {
    pub fn new(
        synthesizer: ConfigSynthesizer,
        snapshots: Arc<dyn SnapshotReader>,
        maintenance_pages: Arc<dyn MaintenancePageSource>,
    ) -> Self {
        Self { synthesizer: Arc::new(synthesizer), snapshots, maintenance_pages }
    }
}

pub fn build_router(state: ApiState) -> Router {
    build_router_with_timeout(state, DEFAULT_REQUEST_TIMEOUT)
}

pub fn build_router_with_timeout(state: ApiState, timeout: Duration) -> Router {
    let maintenance_path = normalize_path(&state.synthesizer.settings().maintenance_path);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/exit-nodes/{exit_node_id}/routing-config", get(get_routing_config_handler))
        .route(&maintenance_path, get(maintenance_page_handler))
        .with_state(state)
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
}
