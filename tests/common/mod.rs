//! Shared integration test helpers for iot-portal.
//!
//! This module provides an in-memory recording [`Transport`], workspace
//! factories and a stub editor used across the `tests/` integration suite.
//!
//! # Usage
//!
//! ```ignore
//! mod common;
//! use common::{RecordingTransport, workspace};
//! ```
//!
//! Note: Rust integration tests use `mod common;` (not `use`) to bring in
//! helpers from `tests/common/mod.rs`. The `#[allow(dead_code)]` attributes
//! suppress warnings when only a subset of helpers are used per file.

#![allow(dead_code)]

use iot_portal::editor::{EditorState, Notice, RequestCompletion};
use iot_portal::{
    EditorContext, EditorError, EditorKind, EditorRegistry, HostedEditor, MountError, TabHandle,
    TabManager,
};
use iot_portal_client::{
    ApiRequest, ApiResponse, ClientError, EntityClient, EntityRecord, Method, Transport,
};
use parking_lot::{Condvar, Mutex};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::runtime::Handle;

/// Id assigned by the default `POST` reply
pub const CREATED_ID: u64 = 100;

/// In-memory backend that records every request.
///
/// Replies come from routes registered with [`RecordingTransport::respond`];
/// unmatched requests get a plausible success envelope. While the transport
/// is held, requests block until [`RecordingTransport::release`].
pub struct RecordingTransport {
    requests: Mutex<Vec<ApiRequest>>,
    routes: Mutex<Vec<(Method, String, ApiResponse)>>,
    held: Mutex<bool>,
    released: Condvar,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            routes: Mutex::new(Vec::new()),
            held: Mutex::new(false),
            released: Condvar::new(),
        })
    }

    /// Reply to `method path` with `status` and a JSON body (overrides earlier routes).
    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) {
        self.routes
            .lock()
            .insert(0, (method, path.to_string(), ApiResponse::new(status, body.to_string())));
    }

    /// Block requests until `release` is called.
    pub fn hold(&self) {
        *self.held.lock() = true;
    }

    pub fn release(&self) {
        *self.held.lock() = false;
        self.released.notify_all();
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }

    /// Number of recorded requests for `method path`
    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn count_method(&self, method: Method) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method == method)
            .count()
    }

    fn default_reply(request: &ApiRequest) -> ApiResponse {
        let data = match request.method {
            Method::Get => {
                let id = request
                    .path
                    .rsplit('/')
                    .next()
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(0);
                json!({"id": id, "name": "stub"})
            }
            Method::Post => {
                let mut body = request.body.clone().unwrap_or_else(|| json!({}));
                if let Some(fields) = body.as_object_mut() {
                    fields.insert("id".to_string(), json!(CREATED_ID));
                }
                body
            }
            Method::Put => request.body.clone().unwrap_or_else(|| json!({})),
            Method::Delete => Value::Null,
        };
        ApiResponse::new(200, json!({"ok": true, "data": data}).to_string())
    }
}

impl Transport for RecordingTransport {
    fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        self.requests.lock().push(request.clone());

        let mut held = self.held.lock();
        while *held {
            self.released.wait(&mut held);
        }
        drop(held);

        let routed = self
            .routes
            .lock()
            .iter()
            .find(|(method, path, _)| *method == request.method && *path == request.path)
            .map(|(_, _, reply)| reply.clone());
        Ok(routed.unwrap_or_else(|| Self::default_reply(request)))
    }
}

/// Workspace with the default editors, backed by `transport`.
///
/// Must be called from inside a tokio runtime.
pub fn workspace(transport: Arc<RecordingTransport>) -> TabManager {
    TabManager::new(
        EditorRegistry::with_defaults(),
        EntityClient::new(transport),
        Handle::current(),
    )
}

/// Workspace with a custom registry.
pub fn workspace_with(registry: EditorRegistry, transport: Arc<RecordingTransport>) -> TabManager {
    TabManager::new(registry, EntityClient::new(transport), Handle::current())
}

/// Slot a [`StubEditor`] factory drops each handle into.
pub type HandleSlot = Arc<Mutex<Vec<TabHandle>>>;

/// Minimal editor that exposes its handle to the test.
pub struct StubEditor {
    kind: EditorKind,
    record: EntityRecord,
    fail_mount: bool,
}

impl HostedEditor for StubEditor {
    fn kind(&self) -> EditorKind {
        self.kind
    }

    fn state(&self) -> EditorState {
        EditorState::Ready
    }

    fn mount(&mut self) -> Result<(), MountError> {
        if self.fail_mount {
            return Err(MountError::Init("stub refused to mount".to_string()));
        }
        Ok(())
    }

    fn on_completion(&mut self, _completion: RequestCompletion) {}

    fn submit(&mut self) -> Result<(), EditorError> {
        Err(EditorError::Unsupported("submit"))
    }

    fn cancel(&mut self) -> Result<(), EditorError> {
        Err(EditorError::Unsupported("cancel"))
    }

    fn record(&self) -> &EntityRecord {
        &self.record
    }

    fn set_field(&mut self, _key: &str, _value: Value) -> Result<(), EditorError> {
        Err(EditorError::Unsupported("set_field"))
    }

    fn notice(&self) -> Option<&Notice> {
        None
    }
}

/// Registry where `kind` is served by a [`StubEditor`] whose handles land in the returned slot.
pub fn stub_registry(kind: EditorKind) -> (EditorRegistry, HandleSlot) {
    let slot: HandleSlot = Arc::new(Mutex::new(Vec::new()));
    let mut registry = EditorRegistry::with_defaults();
    let captured = Arc::clone(&slot);
    registry.register(kind, move |ctx: EditorContext| {
        captured.lock().push(ctx.handle.clone());
        Ok(Box::new(StubEditor {
            kind,
            record: ctx.params.preset.clone(),
            fail_mount: false,
        }) as Box<dyn HostedEditor>)
    });
    (registry, slot)
}

/// Registry where `kind` always fails to mount.
pub fn failing_registry(kind: EditorKind) -> EditorRegistry {
    let mut registry = EditorRegistry::with_defaults();
    registry.register(kind, move |_ctx: EditorContext| {
        Ok(Box::new(StubEditor {
            kind,
            record: EntityRecord::new(),
            fail_mount: true,
        }) as Box<dyn HostedEditor>)
    });
    registry
}

/// `{ "ok": true, "data": ... }`
pub fn ok_envelope(data: Value) -> Value {
    json!({"ok": true, "data": data})
}
