//! HTTP transport with native-tls support.
//!
//! Requests go through a ureq [`Agent`] configured with native-tls, a global
//! timeout, and HTTP status codes treated as data so that error payloads
//! reach the envelope decoder intact.

use crate::error::ClientError;
use crate::transport::{ApiRequest, ApiResponse, Method, Transport};
use iot_portal_config::ApiConfig;
use std::time::Duration;
use ureq::Agent;
use ureq::tls::{RootCerts, TlsConfig, TlsProvider};
use url::Url;

/// Create a new HTTP agent configured with native-tls and a global timeout.
pub fn agent(timeout: Duration) -> Agent {
    let tls_config = TlsConfig::builder()
        .provider(TlsProvider::NativeTls)
        .root_certs(RootCerts::PlatformVerifier)
        .build();

    Agent::config_builder()
        .tls_config(tls_config)
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// Normalise a base URL so relative joins keep its last path segment.
///
/// `http://host/api` and `http://host/api/` both become `http://host/api/`.
///
/// # Errors
///
/// Returns [`ClientError::InvalidResource`] when the URL does not parse or
/// uses a scheme other than http/https.
pub fn parse_base_url(base_url: &str) -> Result<Url, ClientError> {
    let mut url = Url::parse(base_url).map_err(|e| {
        ClientError::InvalidResource(format!("Invalid base URL '{}': {}", base_url, e))
    })?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(ClientError::InvalidResource(format!(
                "Unsupported base URL scheme '{}'; use http or https",
                scheme
            )));
        }
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// Blocking transport that talks to the real backend.
pub struct HttpTransport {
    agent: Agent,
    base_url: Url,
    headers: Vec<(String, String)>,
    max_response_bytes: u64,
}

impl HttpTransport {
    /// Build a transport from the `api` section of the configuration.
    pub fn from_config(api: &ApiConfig) -> Result<Self, ClientError> {
        let base_url = parse_base_url(&api.base_url)?;
        Ok(Self {
            agent: agent(Duration::from_secs(api.timeout_secs)),
            base_url,
            headers: api
                .headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            max_response_bytes: api.max_response_bytes,
        })
    }

    /// Resolve a resource path against the base URL.
    pub fn resolve(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| {
                ClientError::InvalidResource(format!("Invalid resource path '{}': {}", path, e))
            })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        let url = self.resolve(&request.path)?;
        let payload = request
            .body
            .as_ref()
            .map(|body| body.to_string())
            .unwrap_or_default();

        log::debug!("{} {}", request.method, url);

        let result = match request.method {
            Method::Get => {
                let mut builder = self.agent.get(url.as_str()).header("Accept", "application/json");
                for (name, value) in &self.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            Method::Delete => {
                let mut builder = self
                    .agent
                    .delete(url.as_str())
                    .header("Accept", "application/json");
                for (name, value) in &self.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            Method::Post | Method::Put => {
                let builder = if request.method == Method::Post {
                    self.agent.post(url.as_str())
                } else {
                    self.agent.put(url.as_str())
                };
                let mut builder = builder
                    .header("Accept", "application/json")
                    .header("Content-Type", "application/json");
                for (name, value) in &self.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.send(payload.as_bytes())
            }
        };

        let response = result.map_err(|e| {
            ClientError::unreachable(format!("{} {} failed: {}", request.method, url, e))
        })?;

        let status = response.status().as_u16();
        let body = response
            .into_body()
            .with_config()
            .limit(self.max_response_bytes)
            .read_to_string()
            .map_err(|e| {
                ClientError::failed(
                    status,
                    format!("Failed to read response body from {}: {}", url, e),
                )
            })?;

        log::debug!("{} {} -> {}", request.method, url, status);

        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn transport_for(base_url: &str) -> HttpTransport {
        let api = ApiConfig {
            base_url: base_url.to_string(),
            ..ApiConfig::default()
        };
        HttpTransport::from_config(&api).expect("valid base url")
    }

    // --- parse_base_url ---

    #[test]
    fn test_base_url_gains_trailing_slash() {
        let url = parse_base_url("http://localhost:8080/api").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/");
    }

    #[test]
    fn test_base_url_rejects_file_scheme() {
        let err = parse_base_url("file:///etc/passwd").unwrap_err();
        assert!(err.to_string().contains("file"), "Should name the scheme: {err}");
    }

    #[test]
    fn test_base_url_rejects_garbage() {
        assert!(matches!(
            parse_base_url("not a url"),
            Err(ClientError::InvalidResource(_))
        ));
    }

    #[test]
    fn test_resolve_keeps_api_prefix() {
        let transport = transport_for("http://localhost:8080/api");
        let url = transport.resolve("/plugin/7").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/plugin/7");
    }

    // --- execute against a local mock server ---

    #[test]
    fn test_get_returns_status_and_body() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/api/plugin/7")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok":true,"data":{"id":7}}"#)
            .create();

        let transport = transport_for(&format!("{}/api/", server.url()));
        let response = transport.execute(&ApiRequest::get("plugin/7")).unwrap();

        mock.assert();
        assert_eq!(response.status, 200);
        assert!(response.body.contains("\"id\":7"));
    }

    #[test]
    fn test_error_status_is_returned_as_data() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("PUT", "/api/plugin/7")
            .with_status(500)
            .with_body("database locked")
            .create();

        let transport = transport_for(&format!("{}/api/", server.url()));
        let response = transport
            .execute(&ApiRequest::put("plugin/7", json!({"id": 7})))
            .unwrap();

        assert_eq!(response.status, 500);
        assert_eq!(response.body, "database locked");
    }

    #[test]
    fn test_post_sends_json_body_and_configured_headers() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/api/plugin")
            .match_header("content-type", "application/json")
            .match_header("x-token", "secret")
            .match_body(mockito::Matcher::Json(json!({"name": "modbus"})))
            .with_status(200)
            .with_body(r#"{"ok":true,"data":{"id":1,"name":"modbus"}}"#)
            .create();

        let mut api = ApiConfig {
            base_url: format!("{}/api/", server.url()),
            ..ApiConfig::default()
        };
        api.headers.insert("x-token".into(), "secret".into());
        let transport = HttpTransport::from_config(&api).unwrap();

        let response = transport
            .execute(&ApiRequest::post("plugin", json!({"name": "modbus"})))
            .unwrap();

        mock.assert();
        assert_eq!(response.status, 200);
    }

    #[test]
    fn test_unreachable_host_has_no_status() {
        // Port 9 (discard) on localhost is expected to refuse connections.
        let transport = transport_for("http://127.0.0.1:9/api/");
        let err = transport.execute(&ApiRequest::delete("plugin/1")).unwrap_err();
        assert_eq!(err.status(), None);
    }
}
