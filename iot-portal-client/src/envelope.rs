//! Decoding of the backend's `{ ok, error, data, total }` response envelope.

use crate::error::ClientError;
use crate::record::EntityRecord;
use crate::search::Page;
use crate::transport::ApiResponse;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    ok: Option<bool>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    total: Option<u64>,
}

/// Check the status and the `ok` flag, returning the parsed envelope.
fn open(response: &ApiResponse) -> Result<Envelope, ClientError> {
    if !response.is_success() {
        return Err(ClientError::failed(response.status, response.body.clone()));
    }

    // An empty 2xx body (e.g. 204 from DELETE) is a success with no data.
    if response.body.trim().is_empty() {
        return Ok(Envelope {
            ok: None,
            error: None,
            data: Value::Null,
            total: None,
        });
    }

    let envelope: Envelope = serde_json::from_str(&response.body).map_err(|e| {
        log::warn!("Undecodable response body (status {}): {}", response.status, e);
        ClientError::failed(response.status, response.body.clone())
    })?;

    if envelope.ok == Some(false) {
        let payload = envelope
            .error
            .clone()
            .unwrap_or_else(|| response.body.clone());
        return Err(ClientError::failed(response.status, payload));
    }

    Ok(envelope)
}

/// Unwrap `data` as a single record.
pub fn decode_record(response: &ApiResponse) -> Result<EntityRecord, ClientError> {
    let envelope = open(response)?;
    EntityRecord::from_value(envelope.data)
        .ok_or_else(|| ClientError::failed(response.status, response.body.clone()))
}

/// Unwrap the reply to a create or update.
///
/// The backend may acknowledge a save without echoing the record, so an
/// absent or `null` `data` is a success carrying no record.
pub fn decode_saved(response: &ApiResponse) -> Result<Option<EntityRecord>, ClientError> {
    let envelope = open(response)?;
    match envelope.data {
        Value::Null => Ok(None),
        data => EntityRecord::from_value(data)
            .map(Some)
            .ok_or_else(|| ClientError::failed(response.status, response.body.clone())),
    }
}

/// Accept any successful envelope, ignoring `data`.
pub fn decode_unit(response: &ApiResponse) -> Result<(), ClientError> {
    open(response).map(|_| ())
}

/// Unwrap `data` as a list of records plus `total`.
///
/// A missing `total` falls back to the number of rows returned.
pub fn decode_page(response: &ApiResponse) -> Result<Page, ClientError> {
    let envelope = open(response)?;
    let rows = match envelope.data {
        Value::Array(rows) => rows,
        Value::Null => Vec::new(),
        _ => return Err(ClientError::failed(response.status, response.body.clone())),
    };

    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        match EntityRecord::from_value(row) {
            Some(record) => items.push(record),
            None => return Err(ClientError::failed(response.status, response.body.clone())),
        }
    }

    let total = envelope.total.unwrap_or(items.len() as u64);
    Ok(Page { items, total })
}
