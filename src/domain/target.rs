//! Target Domain Types
//!
//! A target is one backend endpoint of a resource, hosted on exactly one site.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::id::{ResourceId, SiteId, TargetId};
use super::path::PathRewrite;

/// Latest result of the target's health check.
///
/// An absent status (`Option::None` on [`Target::health`]) means no health
/// data and is treated exactly like `Healthy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetHealth {
    Healthy,
    Unhealthy,
    Unknown,
}

impl TargetHealth {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetHealth::Healthy => "healthy",
            TargetHealth::Unhealthy => "unhealthy",
            TargetHealth::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TargetHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TargetHealth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "healthy" => Ok(TargetHealth::Healthy),
            "unhealthy" => Ok(TargetHealth::Unhealthy),
            "unknown" => Ok(TargetHealth::Unknown),
            _ => Err(format!("Invalid health status: {}", s)),
        }
    }
}

/// Backend endpoint of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub target_id: TargetId,
    pub resource_id: ResourceId,
    pub site_id: SiteId,
    pub enabled: bool,
    pub ip: Option<String>,
    /// Scheme used to reach the backend (`http`, `https`, `h2c`, ...)
    pub method: Option<String>,
    pub port: Option<u16>,
    /// Port on the tunnel side of a newt site
    pub internal_port: Option<u16>,
    pub health: Option<TargetHealth>,
    pub path: PathRewrite,
    /// Router priority override; `None` or the neutral default means "computed"
    pub priority: Option<i32>,
}

impl Target {
    /// Whether the latest health check rules the target out.
    pub fn is_unhealthy(&self) -> bool {
        matches!(self.health, Some(TargetHealth::Unhealthy))
    }
}
