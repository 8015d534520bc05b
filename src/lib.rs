// Library exports for the binary and the integration tests
//
// # Threading model
//
// A `TabManager` and every editor it hosts are owned by one task and only
// mutated through `&mut`. Request tasks run on the tokio runtime and report
// back through the workspace mailbox; tab titles are the only state shared
// across threads (`parking_lot::RwLock`).

/// Application version (root crate version, for use by sub-crates).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[macro_use]
pub mod debug;

pub mod app;
pub mod cli;
pub mod console;
pub mod editor;
pub mod tab;

pub use editor::{
    ActivationParams, EditorContext, EditorError, EditorKind, EditorRegistry, EditorState,
    EntityEditor, HostedEditor, MountError, Notice,
};
pub use tab::{TabHandle, TabId, TabManager, TabState, TabStripEntry, WorkspaceError};
