//! Tab management for the editor workspace
//!
//! This module provides the core tab infrastructure including:
//! - `Tab`: one workspace pane hosting a single editor
//! - `TabManager`: owns the ordered tab sequence and the active selection
//! - `TabHandle`: the narrow capability an editor uses to rename or close its own tab
//! - `TabId`: Unique identifier for each tab

mod error;
pub(crate) mod handle;
pub mod mailbox;
mod manager;

pub use error::WorkspaceError;
pub use handle::TabHandle;
pub use mailbox::WorkspaceMessage;
pub use manager::TabManager;

use crate::editor::{EditorKind, EditorState, HostedEditor, Notice};
use handle::SharedTitle;
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Unique identifier for a tab
pub type TabId = u64;

/// Where a tab is in its mount lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabLifecycle {
    /// Allocated, content not yet mounted
    Opening,
    /// Hosting a live editor
    Mounted,
    /// The editor could not be built or mounted; the tab shows an error instead
    Failed { reason: String },
}

/// Externally visible state of a tab id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabState {
    Opening,
    Active,
    Inactive,
    Failed,
    Closed,
}

/// One row of the tab strip.
#[derive(Debug, Clone, PartialEq)]
pub struct TabStripEntry {
    pub id: TabId,
    pub title: String,
    pub active: bool,
    pub state: TabState,
    /// `None` for failed tabs
    pub editor_state: Option<EditorState>,
    pub notice: Option<Notice>,
}

/// A single workspace tab
pub struct Tab {
    /// Unique identifier for this tab
    pub(crate) id: TabId,
    kind: EditorKind,
    /// Shared with the editor's handle
    title: SharedTitle,
    /// Cleared on unmount; request tasks check it before posting results
    mounted: Arc<AtomicBool>,
    lifecycle: TabLifecycle,
    content: Option<Box<dyn HostedEditor>>,
}

impl Tab {
    pub(crate) fn new(id: TabId, kind: EditorKind) -> Self {
        Self {
            id,
            kind,
            title: Arc::new(RwLock::new(kind.descriptor().create_title.to_string())),
            mounted: Arc::new(AtomicBool::new(true)),
            lifecycle: TabLifecycle::Opening,
            content: None,
        }
    }

    /// Create a minimal tab for testing (no editor)
    #[cfg(test)]
    pub(crate) fn new_stub(id: TabId) -> Self {
        let mut tab = Self::new(id, EditorKind::Plugin);
        tab.lifecycle = TabLifecycle::Mounted;
        tab
    }

    pub fn id(&self) -> TabId {
        self.id
    }

    pub fn kind(&self) -> EditorKind {
        self.kind
    }

    pub fn title(&self) -> String {
        self.title.read().clone()
    }

    pub fn lifecycle(&self) -> &TabLifecycle {
        &self.lifecycle
    }

    pub fn editor(&self) -> Option<&dyn HostedEditor> {
        self.content.as_deref()
    }

    pub(crate) fn shared_title(&self) -> SharedTitle {
        Arc::clone(&self.title)
    }

    pub(crate) fn mounted_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.mounted)
    }

    pub(crate) fn content_mut(&mut self) -> Option<&mut (dyn HostedEditor + 'static)> {
        self.content.as_deref_mut()
    }

    pub(crate) fn attach(&mut self, editor: Box<dyn HostedEditor>) {
        self.content = Some(editor);
        self.lifecycle = TabLifecycle::Mounted;
    }

    pub(crate) fn fail(&mut self, reason: String) {
        self.mounted.store(false, Ordering::Release);
        self.content = None;
        self.title.write().push_str(" (failed)");
        self.lifecycle = TabLifecycle::Failed { reason };
    }

    /// Detach the editor. The handle reports unmounted from here on.
    pub(crate) fn unmount(&mut self) {
        self.mounted.store(false, Ordering::Release);
        if let Some(mut editor) = self.content.take() {
            editor.unmount();
        }
    }

    pub(crate) fn state(&self, active: bool) -> TabState {
        match self.lifecycle {
            TabLifecycle::Opening => TabState::Opening,
            TabLifecycle::Failed { .. } => TabState::Failed,
            TabLifecycle::Mounted if active => TabState::Active,
            TabLifecycle::Mounted => TabState::Inactive,
        }
    }

    pub(crate) fn strip_entry(&self, active: bool) -> TabStripEntry {
        TabStripEntry {
            id: self.id,
            title: self.title(),
            active,
            state: self.state(active),
            editor_state: self.content.as_ref().map(|editor| editor.state()),
            notice: self.content.as_ref().and_then(|editor| editor.notice().cloned()),
        }
    }
}

impl Drop for Tab {
    fn drop(&mut self) {
        self.unmount();
    }
}
