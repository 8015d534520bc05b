//! Entity access client for the iot-portal backend.
//!
//! Provides:
//! - `client`: [`EntityClient`] with `fetch` / `create` / `update` / `remove` / `list`
//!   plus the `start` / `stop` runtime actions
//! - `transport`: the blocking [`Transport`] seam and its request/response types
//! - `http`: the ureq-backed [`HttpTransport`]
//! - `envelope`: `{ ok, error, data, total }` response decoding
//! - `record`: the opaque [`EntityRecord`] payload
//! - `search`: paginated list parameters and results

pub mod client;
pub mod envelope;
pub mod error;
pub mod http;
pub mod record;
pub mod search;
pub mod transport;

pub use client::{ControlAction, EntityClient, resource_path};
pub use error::ClientError;
pub use http::HttpTransport;
pub use record::{EntityRecord, ID_FIELD};
pub use search::{Filter, Page, SearchParams, SortOrder};
pub use transport::{ApiRequest, ApiResponse, Method, Transport};
