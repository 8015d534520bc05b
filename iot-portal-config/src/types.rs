//! Enum and helper types referenced by [`crate::Config`].

use serde::{Deserialize, Serialize};

/// Log level for the portal's debug log file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// No logging (log file not created)
    Off,
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    #[default]
    Info,
    /// Debug messages
    Debug,
    /// Most verbose
    Trace,
}

impl LogLevel {
    /// Convert to `log::LevelFilter`
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Connection settings for the backend REST API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every resource path is resolved against, e.g. `http://localhost:8080/api/`
    #[serde(default = "crate::defaults::base_url")]
    pub base_url: String,

    /// Global timeout for one request, in seconds
    #[serde(default = "crate::defaults::timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum accepted response body size in bytes
    #[serde(default = "crate::defaults::max_response_bytes")]
    pub max_response_bytes: u64,

    /// Extra headers sent with every request (session cookie, API token, ...)
    #[serde(default)]
    pub headers: std::collections::BTreeMap<String, String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: crate::defaults::base_url(),
            timeout_secs: crate::defaults::timeout_secs(),
            max_response_bytes: crate::defaults::max_response_bytes(),
            headers: Default::default(),
        }
    }
}

/// Workspace behaviour settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Rows requested per page by list views
    #[serde(default = "crate::defaults::page_size")]
    pub page_size: u32,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            page_size: crate::defaults::page_size(),
        }
    }
}
