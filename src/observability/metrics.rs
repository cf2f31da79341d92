//! # Metrics Collection
//!
//! Prometheus metrics for route synthesis.

use crate::config::ObservabilityConfig;
use crate::errors::{EdgeplaneError, Result};
use ::tracing::{info, warn};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Why a route group or snapshot row produced no routes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Invalid path/rewrite combination
    InvalidPath,
    /// HTTP group without a domain or raw group without a proxy port
    Incomplete,
    /// Stored row with a value that does not parse
    MalformedRow,
}

impl DropReason {
    fn as_str(&self) -> &'static str {
        match self {
            DropReason::InvalidPath => "invalid_path",
            DropReason::Incomplete => "incomplete",
            DropReason::MalformedRow => "malformed_row",
        }
    }
}

/// Records synthesis metrics through the global `metrics` recorder.
///
/// Calls are no-ops until an exporter is installed, so the recorder can be
/// used unconditionally.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsRecorder;

impl MetricsRecorder {
    pub fn new() -> Self {
        Self
    }

    /// Register metric descriptions with the exporter
    pub fn describe(&self) {
        describe_counter!("edgeplane_synthesis_total", "Number of synthesis runs by outcome");
        describe_histogram!(
            "edgeplane_synthesis_duration_seconds",
            Unit::Seconds,
            "Wall time of one synthesis run including the snapshot read"
        );
        describe_gauge!("edgeplane_route_groups_total", "Route groups seen in the last run");
        describe_counter!(
            "edgeplane_route_groups_dropped_total",
            "Route groups that produced no routes"
        );
        describe_gauge!("edgeplane_routers_emitted", "Routers emitted in the last run");
        describe_counter!(
            "edgeplane_snapshot_rows_dropped_total",
            "Snapshot rows skipped while reading"
        );
    }

    /// Record a finished synthesis run
    pub fn record_synthesis(&self, exit_node_id: i64, duration: f64, success: bool) {
        let status = if success { "success" } else { "error" };
        let labels = [("exit_node_id", exit_node_id.to_string()), ("status", status.to_string())];
        counter!("edgeplane_synthesis_total", &labels).increment(1);
        histogram!("edgeplane_synthesis_duration_seconds").record(duration);
    }

    /// Record the shape of a synthesized document
    pub fn record_document(&self, exit_node_id: i64, groups: usize, routers: usize) {
        let labels = [("exit_node_id", exit_node_id.to_string())];
        gauge!("edgeplane_route_groups_total", &labels).set(groups as f64);
        gauge!("edgeplane_routers_emitted", &labels).set(routers as f64);
    }

    /// Record a dropped route group
    pub fn record_dropped_group(&self, reason: DropReason) {
        let labels = [("reason", reason.as_str().to_string())];
        counter!("edgeplane_route_groups_dropped_total", &labels).increment(1);
    }

    /// Record a snapshot row skipped by the reader
    pub fn record_dropped_row(&self, reason: DropReason) {
        let labels = [("reason", reason.as_str().to_string())];
        counter!("edgeplane_snapshot_rows_dropped_total", &labels).increment(1);
    }
}

/// Install the Prometheus exporter if metrics are enabled
pub fn init_metrics(config: &ObservabilityConfig) -> Result<()> {
    if !config.enable_metrics {
        return Ok(());
    }

    let metrics_addr = match config.metrics_bind_address() {
        Some(addr) => addr,
        None => {
            warn!("Metrics disabled: no bind address configured");
            return Ok(());
        }
    };

    let socket_addr: SocketAddr = metrics_addr.parse().map_err(|e| {
        EdgeplaneError::config(format!("Invalid metrics bind address '{}': {}", metrics_addr, e))
    })?;

    PrometheusBuilder::new()
        .with_http_listener(socket_addr)
        .add_global_label("service", &config.service_name)
        .install()
        .map_err(|e| {
            EdgeplaneError::config(format!("Failed to initialize metrics exporter: {}", e))
        })?;

    MetricsRecorder::new().describe();

    info!(
        metrics_addr = %metrics_addr,
        service_name = %config.service_name,
        "Metrics collection initialized"
    );

    Ok(())
}
