//! Core primitives.
//!
//! Shared math helpers, configuration and error types used by every other
//! module of the crate.

pub mod config;
pub mod error;
pub mod math;

// Re-export core types
pub use config::{NetConfig, RagdollConfig};
pub use error::{ConfigError, DefinitionError, EngineError};
pub use math::Rect;
