//! Hosted editors: the content mounted inside a workspace tab.
//!
//! This module provides:
//! - `HostedEditor`: the contract every editor satisfies
//! - `EntityEditor`: the generic create/edit editor used for every backend collection
//! - `EditorRegistry`: maps an `EditorKind` to the factory that builds it
//! - `Requester`: launches entity requests for one tab and routes the results back

mod entity_editor;
mod kind;
mod registry;
mod requester;

pub use entity_editor::EntityEditor;
pub use kind::{EditorKind, ResourceDescriptor};
pub use registry::{EditorFactory, EditorRegistry};
pub use requester::{RequestCompletion, Requester};

use crate::tab::TabHandle;
use iot_portal_client::{ControlAction, EntityRecord};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Per-editor lifecycle.
///
/// `Initializing -> Loading -> Ready -> Submitting -> Completed`, with
/// `Submitting -> Ready` when a save fails or a start/stop finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    Initializing,
    Loading,
    Ready,
    Submitting,
    Completed,
}

impl fmt::Display for EditorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EditorState::Initializing => "initializing",
            EditorState::Loading => "loading",
            EditorState::Ready => "ready",
            EditorState::Submitting => "submitting",
            EditorState::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// A transient user-visible message shown inside the tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Info(msg) | Notice::Error(msg) => msg,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Info(msg) => write!(f, "{}", msg),
            Notice::Error(msg) => write!(f, "error: {}", msg),
        }
    }
}

/// Parameters from the activation layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivationParams {
    /// Record to edit; 0 creates a new one
    pub id: u64,
    /// Fields used to seed a new record
    pub preset: EntityRecord,
}

impl ActivationParams {
    pub fn create() -> Self {
        Self::default()
    }

    pub fn edit(id: u64) -> Self {
        Self {
            id,
            preset: EntityRecord::new(),
        }
    }

    pub fn with_preset(mut self, preset: EntityRecord) -> Self {
        self.preset = preset;
        self
    }
}

/// Everything an editor factory receives for one tab.
pub struct EditorContext {
    pub handle: TabHandle,
    pub requester: Requester,
    pub params: ActivationParams,
}

/// Rejected editor operations. These are local to one tab.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    /// The operation is not valid in the editor's current state.
    #[error("editor is {0}")]
    NotReady(EditorState),

    /// A save, delete, start or stop is already pending.
    #[error("a request is already in flight")]
    SubmitInFlight,

    /// The record has not been loaded yet and a load is pending.
    #[error("the record is still loading")]
    FetchInFlight,

    /// Delete was requested for a record that was never created.
    #[error("the record has not been created yet")]
    NotPersisted,

    /// The editor does not implement the operation.
    #[error("{0} is not supported by this editor")]
    Unsupported(&'static str),
}

/// A tab's content failed to initialise.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MountError {
    #[error("no editor registered for {0}")]
    Unregistered(EditorKind),

    #[error("editor failed to initialise: {0}")]
    Init(String),
}

/// The contract every hosted editor satisfies.
///
/// The workspace drives an editor through `mount`, forwards request results
/// to `on_completion`, and calls `unmount` when the tab goes away. The
/// remaining methods are the operations the (external) form layer invokes.
pub trait HostedEditor: Send {
    fn kind(&self) -> EditorKind;

    fn state(&self) -> EditorState;

    /// Read the activation params and start loading if needed.
    fn mount(&mut self) -> Result<(), MountError>;

    /// Apply the result of a request this editor started.
    fn on_completion(&mut self, completion: RequestCompletion);

    /// Save the working record (create or update).
    fn submit(&mut self) -> Result<(), EditorError>;

    /// Close the tab without saving.
    fn cancel(&mut self) -> Result<(), EditorError>;

    /// The working record.
    fn record(&self) -> &EntityRecord;

    /// Edit one field of the working record.
    fn set_field(&mut self, key: &str, value: Value) -> Result<(), EditorError>;

    fn notice(&self) -> Option<&Notice>;

    /// Retry a failed load.
    fn reload(&mut self) -> Result<(), EditorError> {
        Err(EditorError::Unsupported("reload"))
    }

    /// Delete the record from the backend and close the tab.
    fn delete(&mut self) -> Result<(), EditorError> {
        Err(EditorError::Unsupported("delete"))
    }

    /// Start or stop the live resource behind a saved record. The tab stays open.
    fn control(&mut self, action: ControlAction) -> Result<(), EditorError> {
        Err(EditorError::Unsupported(action.as_str()))
    }

    /// The tab is being removed; the handle must not be used afterwards.
    fn unmount(&mut self) {}
}
