//! # Configuration Management
//!
//! Loads [`AppConfig`] from an optional file overlaid by `EDGEPLANE__*`
//! environment variables, then validates it.

pub mod settings;

pub use settings::{
    AppConfig, AuthMiddlewareConfig, DatabaseConfig, ObservabilityConfig, RoutingConfig,
    ServerConfig,
};

use crate::errors::Result;

/// Environment variable prefix; nested keys are separated by `__`
pub const ENV_PREFIX: &str = "EDGEPLANE";

/// Load configuration from `path` (if it exists) and the environment.
///
/// The file format is picked from the extension (`.yml`, `.toml`, `.json`).
/// Environment variables win over the file, e.g.
/// `EDGEPLANE__ROUTING__CERT_RESOLVER=staging`.
pub fn load_config(path: &str) -> Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("routing.additional_middlewares"),
        )
        .build()?;

    let app_config: AppConfig = settings.try_deserialize()?;
    app_config.validate()?;

    tracing::debug!(path = %path, "Loaded configuration");
    Ok(app_config)
}
