//! Denormalized snapshot row
//!
//! One row per (resource, target, site) tuple as delivered by a snapshot
//! reader. Health-check and domain columns are already folded into the
//! target and resource.

use serde::{Deserialize, Serialize};

use super::resource::Resource;
use super::site::Site;
use super::target::Target;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRow {
    pub resource: Resource,
    pub target: Target,
    pub site: Site,
}
