//! Typed errors for the entity access client.

use thiserror::Error;

/// Errors surfaced by [`crate::EntityClient`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The backend (or the network path to it) did not produce a usable success response.
    ///
    /// Covers non-2xx statuses, `{ "ok": false }` envelopes, undecodable bodies and
    /// connection failures. `status` is `None` when no HTTP response was received.
    #[error("{}", describe_failure(.status, .payload))]
    RequestFailed {
        /// HTTP status code, if a response arrived.
        status: Option<u16>,
        /// Response body or error description.
        payload: String,
    },

    /// The request could not be built from the given resource segment / id.
    #[error("Invalid resource: {0}")]
    InvalidResource(String),
}

impl ClientError {
    /// Shorthand for a failure with a received HTTP status.
    pub fn failed(status: u16, payload: impl Into<String>) -> Self {
        ClientError::RequestFailed {
            status: Some(status),
            payload: payload.into(),
        }
    }

    /// Shorthand for a failure where no HTTP response was received.
    pub fn unreachable(payload: impl Into<String>) -> Self {
        ClientError::RequestFailed {
            status: None,
            payload: payload.into(),
        }
    }

    /// HTTP status carried by a `RequestFailed` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::RequestFailed { status, .. } => *status,
            ClientError::InvalidResource(_) => None,
        }
    }
}

fn describe_failure(status: &Option<u16>, payload: &str) -> String {
    match status {
        Some(code) => format!("Request failed with status {code}: {payload}"),
        None => format!("Request failed: {payload}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_status_and_payload() {
        let err = ClientError::failed(404, "not found");
        let msg = err.to_string();
        assert!(msg.contains("404"), "Should mention the status: {msg}");
        assert!(msg.contains("not found"), "Should carry the payload: {msg}");
    }

    #[test]
    fn test_display_without_status() {
        let err = ClientError::unreachable("connection refused");
        assert_eq!(err.to_string(), "Request failed: connection refused");
        assert_eq!(err.status(), None);
    }
}
