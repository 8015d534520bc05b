//! The capability object a hosted editor uses to talk to its own tab.
//!
//! A `TabHandle` can rename its tab and ask for it to be closed. It cannot
//! see or touch any other tab; close requests travel through the workspace
//! mailbox and are applied by the [`super::TabManager`] on its own thread.

use super::TabId;
use super::mailbox::WorkspaceMessage;
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc::UnboundedSender;

/// Title storage shared between a tab and its handle.
pub(crate) type SharedTitle = Arc<RwLock<String>>;

/// Narrow per-tab capability lent to exactly one hosted editor.
#[derive(Clone)]
pub struct TabHandle {
    tab_id: TabId,
    title: SharedTitle,
    mounted: Arc<AtomicBool>,
    mailbox: UnboundedSender<WorkspaceMessage>,
}

impl TabHandle {
    pub(crate) fn new(
        tab_id: TabId,
        title: SharedTitle,
        mounted: Arc<AtomicBool>,
        mailbox: UnboundedSender<WorkspaceMessage>,
    ) -> Self {
        Self {
            tab_id,
            title,
            mounted,
            mailbox,
        }
    }

    /// The tab this handle is bound to
    pub fn tab_id(&self) -> TabId {
        self.tab_id
    }

    /// Current tab label
    pub fn title(&self) -> String {
        self.title.read().clone()
    }

    /// Replace the tab label; the tab strip sees it on its next snapshot.
    pub fn set_title(&self, text: impl Into<String>) {
        let text = text.into();
        log::debug!("Tab {} retitled to {:?}", self.tab_id, text);
        *self.title.write() = text;
    }

    /// Whether the owning tab still hosts this handle's editor.
    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }

    /// Ask the workspace to close this tab.
    ///
    /// The request is applied the next time the workspace processes its
    /// mailbox. Closing an already-removed tab is absorbed by the workspace as
    /// a stale handle.
    pub fn close(&self) {
        log::debug!("Tab {} requested close", self.tab_id);
        if self.mailbox.send(WorkspaceMessage::Close(self.tab_id)).is_err() {
            log::debug!(
                "Workspace is gone; close request for tab {} dropped",
                self.tab_id
            );
        }
    }
}

impl std::fmt::Debug for TabHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TabHandle")
            .field("tab_id", &self.tab_id)
            .field("title", &*self.title.read())
            .field("mounted", &self.is_mounted())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn set_title_is_visible_through_shared_storage() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let title: SharedTitle = Arc::new(RwLock::new("Create Plugin".to_string()));
        let handle = TabHandle::new(1, Arc::clone(&title), Arc::new(AtomicBool::new(true)), tx);

        handle.set_title("Edit Plugin #7");

        assert_eq!(*title.read(), "Edit Plugin #7");
        assert_eq!(handle.title(), "Edit Plugin #7");
    }

    #[test]
    fn close_posts_to_mailbox() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = TabHandle::new(
            4,
            Arc::new(RwLock::new(String::new())),
            Arc::new(AtomicBool::new(true)),
            tx,
        );

        handle.close();

        match rx.try_recv() {
            Ok(WorkspaceMessage::Close(id)) => assert_eq!(id, 4),
            other => panic!("expected close message, got {other:?}"),
        }
    }

    #[test]
    fn close_after_workspace_dropped_does_not_panic() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let handle = TabHandle::new(
            2,
            Arc::new(RwLock::new(String::new())),
            Arc::new(AtomicBool::new(false)),
            tx,
        );
        handle.close();
        assert!(!handle.is_mounted());
    }
}
