//! Environment variable overrides for `Config`.

use super::Config;

/// Overrides `api.base_url` when set to a non-empty value.
pub const API_URL_ENV: &str = "IOT_PORTAL_API_URL";

impl Config {
    /// Apply overrides from the process environment.
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            let url = url.trim();
            if !url.is_empty() {
                log::info!("Using API base URL from {}: {}", API_URL_ENV, url);
                self.api.base_url = url.to_string();
            }
        }
    }
}
