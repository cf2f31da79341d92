//! # Repositories
//!
//! SQL-backed readers over the routing store.

pub mod resource;
pub mod route_snapshot;

pub use resource::ResourceRepository;
pub use route_snapshot::SqliteSnapshotReader;
