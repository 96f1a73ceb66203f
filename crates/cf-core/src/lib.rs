//! cf-core: shared error type and configuration.
//!
//! This crate is the foundational dependency for the other cf-* crates,
//! providing the unified error taxonomy used by the command builder,
//! executor and documentation client, and the application configuration.

pub mod config;
pub mod error;

// Re-export the most commonly used items at the crate root.
pub use config::Config;
pub use error::{Error, Result};
