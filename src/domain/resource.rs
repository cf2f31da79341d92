//! Resource Domain Types
//!
//! A resource is the routable unit: either an HTTP host served on the shared
//! web entrypoints, or a raw TCP/UDP port forwarded on its own entrypoint.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::id::ResourceId;

/// Transport of a raw (non-HTTP) resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportProtocol {
    Tcp,
    Udp,
}

impl TransportProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportProtocol::Tcp => "tcp",
            TransportProtocol::Udp => "udp",
        }
    }
}

impl fmt::Display for TransportProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransportProtocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tcp" => Ok(TransportProtocol::Tcp),
            "udp" => Ok(TransportProtocol::Udp),
            other => Err(format!("Invalid protocol: {}", other)),
        }
    }
}

/// When a maintenance page replaces normal routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MaintenanceMode {
    /// Always show the maintenance page
    Forced,
    /// Show the maintenance page only when no backend is eligible
    #[default]
    Automatic,
}

impl MaintenanceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaintenanceMode::Forced => "forced",
            MaintenanceMode::Automatic => "automatic",
        }
    }
}

impl FromStr for MaintenanceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forced" => Ok(MaintenanceMode::Forced),
            "automatic" => Ok(MaintenanceMode::Automatic),
            _ => Err(format!("Invalid maintenance mode: {}", s)),
        }
    }
}

/// Maintenance-page settings of a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceSettings {
    pub enabled: bool,
    pub mode: MaintenanceMode,
    pub title: Option<String>,
    pub message: Option<String>,
    pub estimated_time: Option<String>,
}

/// Domain a resource's host name belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRef {
    pub domain_id: String,
    /// Per-domain certificate resolver; blank means "use the process default"
    pub cert_resolver: Option<String>,
    /// Shared namespace domain handed out to many organisations
    pub namespace: bool,
}

/// Routable unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub resource_id: ResourceId,
    pub name: String,
    pub full_domain: Option<String>,
    pub subdomain: Option<String>,
    pub domain: Option<DomainRef>,
    pub http: bool,
    pub ssl: bool,
    pub protocol: TransportProtocol,
    pub proxy_port: Option<u16>,
    pub enabled: bool,
    pub sticky_session: bool,
    pub tls_server_name: Option<String>,
    pub set_host_header: Option<String>,
    /// JSON-encoded list of `{ "name": ..., "value": ... }` pairs
    pub headers: Option<String>,
    pub proxy_protocol: bool,
    pub proxy_protocol_version: Option<u8>,
    /// Explicit wildcard-certificate preference; `None` defers to the process default
    pub prefer_wildcard_cert: Option<bool>,
    pub maintenance: MaintenanceSettings,
}

impl Resource {
    /// Whether the resource has a non-empty subdomain label.
    pub fn has_subdomain(&self) -> bool {
        self.subdomain.as_deref().is_some_and(|s| !s.trim().is_empty())
    }
}
