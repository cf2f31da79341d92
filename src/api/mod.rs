//! # HTTP API
//!
//! axum surface polled by the data plane: the routing document per exit node,
//! the maintenance page and a health probe.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use routes::{build_router, build_router_with_timeout, ApiState};
pub use server::start_api_server;
