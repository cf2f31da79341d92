//! Site Domain Types
//!
//! A site hosts backend targets. Its type decides how a target's endpoint is
//! reached: directly by IP for local and wireguard sites, or through the site's
//! tunnel subnet for newt sites.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::id::{ExitNodeId, SiteId};

/// How a site is connected to the exit node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteType {
    /// Targets reachable from the exit node's own network
    Local,
    /// Targets behind a WireGuard peer
    Wireguard,
    /// Targets behind a newt tunnel client, addressed through the site subnet
    Newt,
}

impl SiteType {
    /// All site types, in the default request order
    pub const ALL: [SiteType; 3] = [SiteType::Newt, SiteType::Wireguard, SiteType::Local];

    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SiteType::Local => "local",
            SiteType::Wireguard => "wireguard",
            SiteType::Newt => "newt",
        }
    }
}

impl fmt::Display for SiteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SiteType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "local" => Ok(SiteType::Local),
            "wireguard" => Ok(SiteType::Wireguard),
            "newt" => Ok(SiteType::Newt),
            other => Err(format!("Invalid site type: {}", other)),
        }
    }
}

/// Snapshot of a site as seen by one synthesis call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub site_id: SiteId,
    pub site_type: SiteType,
    pub online: bool,
    /// Tunnel subnet in CIDR notation (newt only)
    pub subnet: Option<String>,
    pub exit_node_id: Option<ExitNodeId>,
}

impl Site {
    /// Network address of the site subnet with any prefix length stripped.
    pub fn subnet_address(&self) -> Option<&str> {
        self.subnet
            .as_deref()
            .map(|subnet| subnet.split('/').next().unwrap_or(subnet).trim())
            .filter(|address| !address.is_empty())
    }
}
