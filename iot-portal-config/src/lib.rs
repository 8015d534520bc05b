//! Configuration system for the iot-portal administration workspace.
//!
//! This crate provides configuration loading, saving, and default values:
//!
//! - Backend API connection settings (base URL, timeout, body limit, headers)
//! - Debug log level
//! - Tab workspace settings

pub mod config;
pub mod defaults;
pub mod error;
mod types;

// Re-export main types for convenience
pub use config::{API_URL_ENV, Config};
pub use error::ConfigError;
pub use types::{ApiConfig, LogLevel, WorkspaceConfig};
