//! Routing-configuration synthesis
//!
//! Turns a snapshot of resources, targets and sites into the data plane's
//! dynamic configuration document.
//!
//! ## Module Organization
//!
//! - `group`: aggregation of snapshot rows into route groups
//! - `path`: validation of path match / rewrite combinations
//! - `endpoint`: per-site-type endpoint resolution
//! - `availability`: backend eligibility with the site-online preference
//! - `maintenance`: maintenance-page decision and route
//! - `tls`: certificate resolver and wildcard preference
//! - `rule`: match rules and router priorities
//! - `middleware`: middleware chains and the path rewrite generator
//! - `backend`: HTTP and stream services
//! - `assembler`: [`ConfigSynthesizer`], which puts it all together
//! - `document`: the output document types

pub mod assembler;
pub mod availability;
pub mod backend;
pub mod document;
pub mod endpoint;
pub mod group;
pub mod maintenance;
pub mod middleware;
pub mod path;
pub mod rule;
pub mod tls;

#[cfg(test)]
pub(crate) mod test_support;

pub use assembler::ConfigSynthesizer;
pub use document::RoutingDocument;
pub use endpoint::{resolver_for, Endpoint, EndpointResolver, Transport};
pub use group::{aggregate, RouteGroup, RouteKey, RouteKind};
pub use middleware::{RewriteMiddlewareGenerator, RewriteMiddlewares, StandardRewriteGenerator};
pub use path::validate_path_rewrite;
