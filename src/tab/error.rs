//! Workspace-level error types.

use super::TabId;
use thiserror::Error;

/// Contract violations reported by the [`super::TabManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WorkspaceError {
    /// An operation referenced a tab that is not open.
    #[error("tab {0} is not open")]
    UnknownTab(TabId),

    /// A tab handle asked to close a tab that was already removed.
    #[error("close requested for tab {0}, which is already closed")]
    StaleHandle(TabId),
}
