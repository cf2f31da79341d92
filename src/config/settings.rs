//! # Configuration Settings
//!
//! Defines the configuration structure for the edgeplane control plane.

use crate::errors::{EdgeplaneError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server configuration
    #[validate(nested)]
    pub server: ServerConfig,

    /// Database configuration
    #[validate(nested)]
    pub database: DatabaseConfig,

    /// Observability configuration
    #[validate(nested)]
    pub observability: ObservabilityConfig,

    /// Process-wide routing settings consumed by the synthesizer
    #[validate(nested)]
    pub routing: RoutingConfig,
}

impl AppConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(EdgeplaneError::from)?;
        self.validate_custom()?;
        Ok(())
    }

    /// Cross-field checks the validator derive cannot express
    fn validate_custom(&self) -> Result<()> {
        if self.observability.enable_metrics && self.server.port == self.observability.metrics_port
        {
            return Err(EdgeplaneError::validation(
                "Server and metrics ports cannot be the same",
            ));
        }

        if !self.database.is_sqlite() {
            return Err(EdgeplaneError::validation_field(
                "Database URL must start with 'sqlite:'",
                "database.url",
            ));
        }

        if self.routing.http_entrypoint == self.routing.https_entrypoint {
            return Err(EdgeplaneError::validation_field(
                "HTTP and HTTPS entrypoints must differ",
                "routing.https_entrypoint",
            ));
        }

        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address
    #[validate(length(min = 1, message = "Host cannot be empty"))]
    pub host: String,

    /// Server port
    #[validate(range(min = 1, message = "Port must be between 1 and 65535"))]
    pub port: u16,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 3001, timeout_seconds: 30 }
    }
}

impl ServerConfig {
    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database connection URL
    #[validate(length(min = 1, message = "Database URL cannot be empty"))]
    pub url: String,

    /// Maximum number of connections in the pool
    #[validate(range(min = 1, max = 100, message = "Max connections must be between 1 and 100"))]
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    #[validate(range(max = 50, message = "Min connections must be between 0 and 50"))]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[validate(range(
        min = 1,
        max = 60,
        message = "Connect timeout must be between 1 and 60 seconds"
    ))]
    pub connect_timeout_seconds: u64,

    /// Idle timeout in seconds (0 = no timeout)
    pub idle_timeout_seconds: u64,

    /// Enable automatic migrations
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./data/edgeplane.db".to_string(),
            max_connections: 10,
            min_connections: 0,
            connect_timeout_seconds: 10,
            idle_timeout_seconds: 600,
            auto_migrate: true,
        }
    }
}

impl DatabaseConfig {
    /// Get connection timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    /// Get idle timeout as Duration (None if 0)
    pub fn idle_timeout(&self) -> Option<Duration> {
        if self.idle_timeout_seconds == 0 {
            None
        } else {
            Some(Duration::from_secs(self.idle_timeout_seconds))
        }
    }

    /// Check if this is a SQLite configuration
    pub fn is_sqlite(&self) -> bool {
        self.url.starts_with("sqlite:")
    }
}

/// Observability configuration for logging and metrics
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable metrics collection
    pub enable_metrics: bool,

    /// Metrics server port (0 = disabled)
    pub metrics_port: u16,

    /// Service name attached to metrics
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,

    /// Log level (trace, debug, info, warn, error) used when RUST_LOG is unset
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            enable_metrics: false,
            metrics_port: 9090,
            service_name: "edgeplane".to_string(),
            log_level: "info".to_string(),
            json_logging: false,
        }
    }
}

impl ObservabilityConfig {
    /// Get metrics bind address (None if disabled)
    pub fn metrics_bind_address(&self) -> Option<String> {
        if self.metrics_port == 0 {
            None
        } else {
            Some(format!("0.0.0.0:{}", self.metrics_port))
        }
    }
}

/// Forward-auth middleware injected in front of every HTTP router
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AuthMiddlewareConfig {
    /// Middleware (and plugin) name
    #[validate(length(min = 1, message = "Auth middleware name cannot be empty"))]
    pub name: String,

    /// Base URL the plugin calls to verify sessions
    #[validate(url(message = "Auth API base URL must be a valid URL"))]
    pub api_base_url: String,

    pub session_cookie_name: String,

    pub resource_session_request_param: String,
}

impl Default for AuthMiddlewareConfig {
    fn default() -> Self {
        Self {
            name: "badger".to_string(),
            api_base_url: "http://edgeplane:3001/api/v1".to_string(),
            session_cookie_name: "p_session_token".to_string(),
            resource_session_request_param: "p_session_request".to_string(),
        }
    }
}

/// Process-wide routing settings: entrypoints, certificates, maintenance upstream
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RoutingConfig {
    #[validate(length(min = 1, message = "HTTP entrypoint cannot be empty"))]
    pub http_entrypoint: String,

    #[validate(length(min = 1, message = "HTTPS entrypoint cannot be empty"))]
    pub https_entrypoint: String,

    /// Default certificate resolver when the domain does not name one
    #[validate(length(min = 1, message = "Certificate resolver cannot be empty"))]
    pub cert_resolver: String,

    /// Default wildcard-certificate preference
    pub prefer_wildcard_cert: bool,

    /// Host serving the maintenance page
    #[validate(length(min = 1, message = "Maintenance host cannot be empty"))]
    pub maintenance_host: String,

    #[validate(range(min = 1, message = "Maintenance port must be between 1 and 65535"))]
    pub maintenance_port: u16,

    /// Path every maintenance request is rewritten to
    #[validate(length(min = 1, message = "Maintenance path cannot be empty"))]
    pub maintenance_path: String,

    #[validate(nested)]
    pub auth_middleware: AuthMiddlewareConfig,

    /// Extra middleware names appended after the auth middleware
    pub additional_middlewares: Vec<String>,

    #[validate(length(min = 1, message = "Redirect middleware name cannot be empty"))]
    pub redirect_middleware_name: String,

    #[validate(length(min = 1, message = "Sticky cookie name cannot be empty"))]
    pub sticky_cookie_name: String,

    /// Prefix of the file-provider transports that speak PROXY protocol
    #[validate(length(min = 1, message = "Proxy protocol transport prefix cannot be empty"))]
    pub pp_transport_prefix: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            http_entrypoint: "web".to_string(),
            https_entrypoint: "websecure".to_string(),
            cert_resolver: "letsencrypt".to_string(),
            prefer_wildcard_cert: false,
            maintenance_host: "edgeplane".to_string(),
            maintenance_port: 3002,
            maintenance_path: "/maintenance-screen".to_string(),
            auth_middleware: AuthMiddlewareConfig::default(),
            additional_middlewares: Vec::new(),
            redirect_middleware_name: "redirect-to-https".to_string(),
            sticky_cookie_name: "p_sticky".to_string(),
            pp_transport_prefix: "pp-transport-v".to_string(),
        }
    }
}

impl RoutingConfig {
    /// URL of the maintenance page upstream
    pub fn maintenance_url(&self) -> String {
        format!("http://{}:{}", self.maintenance_host, self.maintenance_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validation() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_server_config_bind_address() {
        let config = ServerConfig { host: "127.0.0.1".to_string(), port: 8080, ..Default::default() };
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_database_config_timeouts() {
        let config = DatabaseConfig {
            connect_timeout_seconds: 15,
            idle_timeout_seconds: 300,
            ..Default::default()
        };
        assert_eq!(config.connect_timeout(), Duration::from_secs(15));
        assert_eq!(config.idle_timeout(), Some(Duration::from_secs(300)));

        let config_no_idle = DatabaseConfig { idle_timeout_seconds: 0, ..Default::default() };
        assert_eq!(config_no_idle.idle_timeout(), None);
    }

    #[test]
    fn test_observability_config_metrics_address() {
        let config = ObservabilityConfig { metrics_port: 9090, ..Default::default() };
        assert_eq!(config.metrics_bind_address(), Some("0.0.0.0:9090".to_string()));

        let disabled_config = ObservabilityConfig { metrics_port: 0, ..Default::default() };
        assert_eq!(disabled_config.metrics_bind_address(), None);
    }

    #[test]
    fn test_maintenance_url() {
        let routing = RoutingConfig::default();
        assert_eq!(routing.maintenance_url(), "http://edgeplane:3002");
    }

    #[test]
    fn test_config_validation_errors() {
        let mut config = AppConfig::default();
        config.observability.enable_metrics = true;
        config.observability.metrics_port = config.server.port;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.database.url = "mysql://localhost/edge".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.routing.https_entrypoint = config.routing.http_entrypoint.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_ranges() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.routing.cert_resolver = String::new();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.routing.auth_middleware.api_base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }
}
