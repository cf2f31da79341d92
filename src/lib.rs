//! # Edgeplane
//!
//! Edgeplane turns the relational state of a tunnelled reverse-proxy
//! deployment (resources, targets, sites, health checks and domains) into the
//! dynamic configuration document an edge proxy polls and hot-reloads.
//!
//! ## Architecture
//!
//! ```text
//! SQLite snapshot → SnapshotReader → ConfigSynthesizer → RoutingDocument → HTTP API
//!                                          ↓
//!                                 Logging / Metrics
//! ```
//!
//! ## Core Components
//!
//! - **Storage**: SQLx over SQLite, one bulk join per synthesis call
//! - **Routing**: pure synthesis of routers, services, middlewares and transports
//! - **API**: axum endpoints for the routing document and the maintenance page
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use edgeplane::domain::ExitNodeId;
//! use edgeplane::storage::{SnapshotQuery, StaticSnapshotReader};
//! use edgeplane::{AppConfig, ConfigSynthesizer, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = AppConfig::default();
//!     let reader = StaticSnapshotReader::from_json_file("rows.json")?;
//!     let synthesizer = ConfigSynthesizer::new(config.routing);
//!     let document = synthesizer
//!         .generate(&reader, &SnapshotQuery::new(ExitNodeId::new(1)))
//!         .await?;
//!     println!("{}", serde_json::to_string_pretty(&document).unwrap_or_default());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod routing;
pub mod storage;

pub use config::AppConfig;
pub use errors::{Error, Result};
pub use routing::{ConfigSynthesizer, RoutingDocument};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
