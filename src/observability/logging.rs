//! # Structured Logging
//!
//! Subscriber initialisation and span macros built on the tracing ecosystem.

use crate::config::ObservabilityConfig;
use crate::errors::{EdgeplaneError, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Fails if a global
/// subscriber is already installed.
pub fn init_logging(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| EdgeplaneError::config(format!("Invalid log level: {}", e)))?;

    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json_logging {
        registry.with(fmt::layer().json().with_current_span(true)).try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    result.map_err(|e| {
        EdgeplaneError::config(format!("Failed to install tracing subscriber: {}", e))
    })
}

/// Create a tracing span for one synthesis run.
///
/// ```rust,ignore
/// let span = synth_span!(exit_node_id);
/// let span = synth_span!(exit_node_id, site_types = "local,newt");
/// ```
#[macro_export]
macro_rules! synth_span {
    ($exit_node_id:expr) => {
        tracing::info_span!(
            "synthesis",
            exit_node_id = %$exit_node_id,
            synthesis_id = %uuid::Uuid::new_v4()
        )
    };
    ($exit_node_id:expr, $($field:tt)*) => {
        tracing::info_span!(
            "synthesis",
            exit_node_id = %$exit_node_id,
            synthesis_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Create a tracing span for database operations.
#[macro_export]
macro_rules! db_span {
    ($operation:expr) => {
        tracing::debug_span!(
            "db_operation",
            operation = %$operation,
            operation_id = %uuid::Uuid::new_v4()
        )
    };
    ($operation:expr, $($field:tt)*) => {
        tracing::debug_span!(
            "db_operation",
            operation = %$operation,
            operation_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Log configuration at startup
pub fn log_config_info(config: &crate::config::AppConfig) {
    tracing::info!(
        server_address = %config.server.bind_address(),
        database_url = %config.database.url,
        http_entrypoint = %config.routing.http_entrypoint,
        https_entrypoint = %config.routing.https_entrypoint,
        cert_resolver = %config.routing.cert_resolver,
        prefer_wildcard_cert = config.routing.prefer_wildcard_cert,
        metrics_enabled = config.observability.enable_metrics,
        "edgeplane configuration"
    );
}
