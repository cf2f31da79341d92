//! # Error Handling
//!
//! Error handling for the edgeplane control plane. Recoverable conditions inside
//! route synthesis are logged and degrade to fewer routes; only failures of the
//! snapshot read are surfaced to callers through [`Result`].

pub mod types;

pub use types::{EdgeplaneError, Result};

/// Short alias used across the crate
pub use types::EdgeplaneError as Error;
