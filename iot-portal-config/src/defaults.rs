//! Default value functions for configuration.
//!
//! Used as `#[serde(default = "crate::defaults::...")]` attributes on config fields.

pub fn base_url() -> String {
    "http://localhost:8080/api/".to_string()
}

pub fn timeout_secs() -> u64 {
    30
}

/// 10 MB
pub fn max_response_bytes() -> u64 {
    10 * 1024 * 1024
}

pub fn page_size() -> u32 {
    20
}
