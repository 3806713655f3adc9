//! Shared library for the anime-helper service.
//!
//! This crate provides common functionality used by the service crate:
//! - Configuration management
//! - Logging infrastructure
//! - Canonical data models returned by the tools

pub mod config;
pub mod logging;
pub mod models;

// Re-export commonly used types
pub use config::Config;
pub use logging::LogConfig;
pub use models::*;

/// Common result type using anyhow::Error
pub type Result<T> = anyhow::Result<T>;
