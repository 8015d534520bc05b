//! Generic typed request layer over a named resource collection.
//!
//! REST mapping:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | `fetch`   | `GET {segment}/{id}` |
//! | `create`  | `POST {segment}` (body without `id`) |
//! | `update`  | `PUT {segment}/{id}` |
//! | `remove`  | `DELETE {segment}/{id}` |
//! | `list`    | `POST {segment}/list` |
//! | `start` / `stop` | `GET {segment}/{id}/start`, `GET {segment}/{id}/stop` |
//!
//! Every operation is single-shot: no retry, no caching, no local state.

use crate::envelope::{decode_page, decode_record, decode_saved, decode_unit};
use crate::error::ClientError;
use crate::http::HttpTransport;
use crate::record::EntityRecord;
use crate::search::{Page, SearchParams};
use crate::transport::{ApiRequest, ApiResponse, Transport};
use iot_portal_config::ApiConfig;
use std::fmt;
use std::sync::Arc;

/// Runtime action on a live backend resource such as a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    Start,
    Stop,
}

impl ControlAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ControlAction::Start => "start",
            ControlAction::Stop => "stop",
        }
    }
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build `{segment}/{id}`.
pub fn resource_path(segment: &str, id: u64) -> String {
    format!("{}/{}", segment.trim_matches('/'), id)
}

fn check_segment(segment: &str) -> Result<&str, ClientError> {
    let trimmed = segment.trim_matches('/');
    if trimmed.is_empty() {
        return Err(ClientError::InvalidResource(
            "resource segment must not be empty".to_string(),
        ));
    }
    Ok(trimmed)
}

fn check_id(segment: &str, id: u64) -> Result<(), ClientError> {
    if id == 0 {
        return Err(ClientError::InvalidResource(format!(
            "'{}' requires a non-zero id",
            segment
        )));
    }
    Ok(())
}

/// Entity access client, cheap to clone and shareable across tasks.
#[derive(Clone)]
pub struct EntityClient {
    transport: Arc<dyn Transport>,
}

impl EntityClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Client backed by the real HTTP transport.
    pub fn from_config(api: &ApiConfig) -> Result<Self, ClientError> {
        Ok(Self::new(Arc::new(HttpTransport::from_config(api)?)))
    }

    /// Run one blocking transport call on the blocking pool.
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let transport = Arc::clone(&self.transport);
        tokio::task::spawn_blocking(move || transport.execute(&request))
            .await
            .map_err(|e| ClientError::unreachable(format!("request task failed: {}", e)))?
    }

    /// `GET {path}` where `path` is `segment/id`.
    pub async fn fetch(&self, path: &str) -> Result<EntityRecord, ClientError> {
        let path = check_segment(path)?;
        let response = self.execute(ApiRequest::get(path)).await?;
        decode_record(&response)
    }

    /// `POST {segment}` with the record minus its identifier.
    ///
    /// Returns the stored record when the backend echoes it.
    pub async fn create(
        &self,
        segment: &str,
        record: &EntityRecord,
    ) -> Result<Option<EntityRecord>, ClientError> {
        let segment = check_segment(segment)?;
        let body = record.without_id().into_value();
        let response = self.execute(ApiRequest::post(segment, body)).await?;
        decode_saved(&response)
    }

    /// `PUT {segment}/{id}` with the full record.
    pub async fn update(
        &self,
        segment: &str,
        id: u64,
        record: &EntityRecord,
    ) -> Result<Option<EntityRecord>, ClientError> {
        let segment = check_segment(segment)?;
        check_id(segment, id)?;
        let body = record.clone().into_value();
        let response = self
            .execute(ApiRequest::put(resource_path(segment, id), body))
            .await?;
        decode_saved(&response)
    }

    /// `DELETE {segment}/{id}`.
    pub async fn remove(&self, segment: &str, id: u64) -> Result<(), ClientError> {
        let segment = check_segment(segment)?;
        check_id(segment, id)?;
        let response = self
            .execute(ApiRequest::delete(resource_path(segment, id)))
            .await?;
        decode_unit(&response)
    }

    /// `GET {segment}/{id}/{action}`. The reply carries no data.
    pub async fn control(
        &self,
        segment: &str,
        id: u64,
        action: ControlAction,
    ) -> Result<(), ClientError> {
        let segment = check_segment(segment)?;
        check_id(segment, id)?;
        let path = format!("{}/{}", resource_path(segment, id), action);
        let response = self.execute(ApiRequest::get(path)).await?;
        decode_unit(&response)
    }

    pub async fn start(&self, segment: &str, id: u64) -> Result<(), ClientError> {
        self.control(segment, id, ControlAction::Start).await
    }

    pub async fn stop(&self, segment: &str, id: u64) -> Result<(), ClientError> {
        self.control(segment, id, ControlAction::Stop).await
    }

    /// `POST {segment}/list` with paging, keyword, filter and sort parameters.
    pub async fn list(&self, segment: &str, params: &SearchParams) -> Result<Page, ClientError> {
        let segment = check_segment(segment)?;
        let body = serde_json::to_value(params)
            .map_err(|e| ClientError::InvalidResource(format!("unencodable search: {}", e)))?;
        let response = self
            .execute(ApiRequest::post(format!("{}/list", segment), body))
            .await?;
        decode_page(&response)
    }
}
