//! Semantic validation for `Config`.

use super::Config;
use crate::error::ConfigError;

impl Config {
    /// Check field values that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = url::Url::parse(&self.api.base_url).map_err(|e| {
            ConfigError::Validation(format!(
                "api.base_url '{}' is not a valid URL: {}",
                self.api.base_url, e
            ))
        })?;

        match parsed.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(ConfigError::Validation(format!(
                    "api.base_url scheme '{}' is not supported; use http or https",
                    scheme
                )));
            }
        }

        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "api.timeout_secs must be greater than zero".to_string(),
            ));
        }

        if self.api.max_response_bytes == 0 {
            return Err(ConfigError::Validation(
                "api.max_response_bytes must be greater than zero".to_string(),
            ));
        }

        if self.workspace.page_size == 0 {
            return Err(ConfigError::Validation(
                "workspace.page_size must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
