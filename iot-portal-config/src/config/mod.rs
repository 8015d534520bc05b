//! Core `Config` struct definition.
//!
//! # Sub-modules
//!
//! - [`persistence`]: `load` / `save` and XDG path helpers
//! - [`env_vars`]: environment variable overrides applied after parsing
//! - [`validation`]: semantic checks run before a config is accepted

mod env_vars;
mod persistence;
mod validation;

pub use env_vars::API_URL_ENV;

use crate::types::{ApiConfig, LogLevel, WorkspaceConfig};
use serde::{Deserialize, Serialize};

/// Portal configuration, serialised as `~/.config/iot-portal/config.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Backend REST API connection settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Debug log verbosity (overridden by `RUST_LOG` and `--log-level`)
    #[serde(default)]
    pub log_level: LogLevel,

    /// Tab workspace settings
    #[serde(default)]
    pub workspace: WorkspaceConfig,
}

impl Config {
    /// Return a copy of this config pointing at a different API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api.base_url = base_url.into();
        self
    }
}
