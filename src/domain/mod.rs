//! Domain layer
//!
//! Pure domain entities with zero infrastructure dependencies beyond the sqlx
//! encoding of identifiers. These are the inputs of route synthesis.
//!
//! ## Module Organization
//!
//! - `id`: Type-safe identifiers with NewType pattern
//! - `resource`: Routable resources, maintenance settings, transport protocol
//! - `target`: Backend targets and their health status
//! - `site`: Sites hosting targets
//! - `path`: Path match and rewrite specification
//! - `row`: The denormalized row a snapshot reader yields

pub mod id;
pub mod path;
pub mod resource;
pub mod row;
pub mod site;
pub mod target;

pub use id::{ExitNodeId, ResourceId, SiteId, TargetId};
pub use path::{normalize_path, PathMatchType, PathRewrite, RewritePathType};
pub use resource::{
    DomainRef, MaintenanceMode, MaintenanceSettings, Resource, TransportProtocol,
};
pub use row::RouteRow;
pub use site::{Site, SiteType};
pub use target::{Target, TargetHealth};
