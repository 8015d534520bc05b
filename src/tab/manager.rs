//! Tab manager for coordinating the editor tabs of one workspace

use super::{
    Tab, TabHandle, TabId, TabLifecycle, TabState, TabStripEntry, WorkspaceError,
    WorkspaceMessage,
};
use crate::editor::{
    ActivationParams, EditorContext, EditorKind, EditorRegistry, HostedEditor, MountError,
    Requester,
};
use iot_portal_client::EntityClient;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Manages the ordered set of editor tabs in a workspace
///
/// All tab and editor state is mutated through `&mut self`. Work that happens
/// elsewhere (request tasks, handle close requests) reaches the manager as a
/// [`WorkspaceMessage`] and is applied when the owner pumps the mailbox with
/// [`TabManager::process_pending`], [`TabManager::process_next`] or
/// [`TabManager::settle`].
pub struct TabManager {
    /// All tabs in this workspace, in order
    tabs: Vec<Tab>,
    /// Currently active tab ID
    active_tab_id: Option<TabId>,
    /// Counter for generating unique tab IDs
    next_tab_id: TabId,
    registry: EditorRegistry,
    client: EntityClient,
    runtime: Handle,
    mailbox_tx: UnboundedSender<WorkspaceMessage>,
    mailbox_rx: UnboundedReceiver<WorkspaceMessage>,
    /// Requests spawned by editors whose completion has not been processed yet
    in_flight: Arc<AtomicUsize>,
}

impl TabManager {
    /// Create a new empty tab manager
    ///
    /// # Arguments
    /// * `registry` - Factories for every editor kind the workspace can open
    /// * `client` - Entity access client shared by all editors
    /// * `runtime` - Tokio runtime the editors' requests are spawned on
    pub fn new(registry: EditorRegistry, client: EntityClient, runtime: Handle) -> Self {
        let (mailbox_tx, mailbox_rx) = mpsc::unbounded_channel();
        Self {
            tabs: Vec::new(),
            active_tab_id: None,
            next_tab_id: 1,
            registry,
            client,
            runtime,
            mailbox_tx,
            mailbox_rx,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Open a new tab hosting an editor of `kind` and return its ID
    ///
    /// The new tab is appended and becomes active. If the editor cannot be
    /// built or mounted the tab is still opened, in the `Failed` state.
    pub fn open(&mut self, kind: EditorKind, params: ActivationParams) -> TabId {
        let id = self.next_tab_id;
        self.next_tab_id += 1;

        let mut tab = Tab::new(id, kind);
        let handle = TabHandle::new(
            id,
            tab.shared_title(),
            tab.mounted_flag(),
            self.mailbox_tx.clone(),
        );
        let requester = Requester::new(
            id,
            self.client.clone(),
            self.mailbox_tx.clone(),
            Arc::clone(&self.in_flight),
            tab.mounted_flag(),
            self.runtime.clone(),
        );
        let ctx = EditorContext {
            handle,
            requester,
            params,
        };

        match self.mount_editor(kind, ctx) {
            Ok(editor) => tab.attach(editor),
            Err(reason) => {
                log::error!("Tab {} ({}) failed to mount: {}", id, kind, reason);
                tab.fail(reason);
            }
        }

        self.tabs.push(tab);

        // Always switch to the new tab
        self.active_tab_id = Some(id);

        crate::debug_info!(
            "TAB",
            "Opened tab {} for {} (total: {})",
            id,
            kind,
            self.tabs.len()
        );

        id
    }

    /// Build and mount an editor, containing factory errors and panics.
    fn mount_editor(
        &self,
        kind: EditorKind,
        ctx: EditorContext,
    ) -> Result<Box<dyn HostedEditor>, String> {
        let registry = &self.registry;
        let outcome = panic::catch_unwind(AssertUnwindSafe(move || {
            let mut editor = registry.build(kind, ctx)?;
            editor.mount()?;
            Ok::<_, MountError>(editor)
        }));

        match outcome {
            Ok(Ok(editor)) => Ok(editor),
            Ok(Err(e)) => Err(e.to_string()),
            Err(payload) => Err(panic_message(payload.as_ref())),
        }
    }

    /// Make a tab the active one
    ///
    /// No-op when the tab is already active.
    pub fn activate(&mut self, id: TabId) -> Result<(), WorkspaceError> {
        if !self.tabs.iter().any(|t| t.id == id) {
            log::error!("activate: {}", WorkspaceError::UnknownTab(id));
            return Err(WorkspaceError::UnknownTab(id));
        }
        if self.active_tab_id != Some(id) {
            self.active_tab_id = Some(id);
            log::debug!("Switched to tab {}", id);
        }
        Ok(())
    }

    /// Close a tab from the tab strip
    ///
    /// An in-flight request of the tab is not cancelled; its result is discarded.
    pub fn close_tab(&mut self, id: TabId) -> Result<(), WorkspaceError> {
        if self.remove_tab(id) {
            Ok(())
        } else {
            log::error!("close_tab: {}", WorkspaceError::UnknownTab(id));
            Err(WorkspaceError::UnknownTab(id))
        }
    }

    /// Close a tab on behalf of its handle
    ///
    /// A second close from the same handle finds nothing to remove and is
    /// reported as `StaleHandle`.
    pub fn close_by_handle(&mut self, id: TabId) -> Result<(), WorkspaceError> {
        if self.remove_tab(id) {
            Ok(())
        } else {
            log::debug!("{}", WorkspaceError::StaleHandle(id));
            Err(WorkspaceError::StaleHandle(id))
        }
    }

    /// Unmount and remove a tab, reselecting if it was active.
    /// Returns false if the tab was not open.
    fn remove_tab(&mut self, id: TabId) -> bool {
        let Some(idx) = self.tabs.iter().position(|t| t.id == id) else {
            return false;
        };

        let mut tab = self.tabs.remove(idx);
        log::info!("Closing {} tab {} (index {})", tab.kind(), id, idx);
        tab.unmount();

        // If we closed the active tab, the one before it takes over
        // (the new first tab when it was first)
        if self.active_tab_id == Some(id) {
            self.active_tab_id = if self.tabs.is_empty() {
                None
            } else {
                Some(self.tabs[idx.saturating_sub(1)].id)
            };
        }

        true
    }

    /// Switch to the next tab (wraps around)
    pub fn next_tab(&mut self) {
        if self.tabs.len() <= 1 {
            return;
        }

        if let Some(current_idx) = self.active_tab_index() {
            let next_idx = (current_idx + 1) % self.tabs.len();
            self.active_tab_id = Some(self.tabs[next_idx].id);
        }
    }

    /// Switch to the previous tab (wraps around)
    pub fn prev_tab(&mut self) {
        if self.tabs.len() <= 1 {
            return;
        }

        if let Some(current_idx) = self.active_tab_index() {
            let prev_idx = if current_idx == 0 {
                self.tabs.len() - 1
            } else {
                current_idx - 1
            };
            self.active_tab_id = Some(self.tabs[prev_idx].id);
        }
    }

    /// Switch to tab by position (1-based)
    pub fn switch_to_index(&mut self, index: usize) {
        if index > 0 && index <= self.tabs.len() {
            self.active_tab_id = Some(self.tabs[index - 1].id);
        }
    }

    /// Move a tab to a specific index
    /// Returns true if the tab was actually moved, false if not found or already at target
    pub fn move_tab_to_index(&mut self, id: TabId, target_index: usize) -> bool {
        let current_idx = match self.tabs.iter().position(|t| t.id == id) {
            Some(idx) => idx,
            None => return false,
        };

        let clamped_target = target_index.min(self.tabs.len().saturating_sub(1));
        if clamped_target == current_idx {
            return false;
        }

        let tab = self.tabs.remove(current_idx);
        self.tabs.insert(clamped_target, tab);
        log::debug!(
            "Moved tab {} from index {} to {}",
            id,
            current_idx,
            clamped_target
        );
        true
    }

    /// Get the number of tabs
    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    /// Get the active tab ID
    pub fn active_tab_id(&self) -> Option<TabId> {
        self.active_tab_id
    }

    /// Get index of active tab (0-based)
    pub fn active_tab_index(&self) -> Option<usize> {
        self.active_tab_id
            .and_then(|id| self.tabs.iter().position(|t| t.id == id))
    }

    /// Get all tabs as a slice
    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    /// Tab IDs in display order
    pub fn tab_ids(&self) -> Vec<TabId> {
        self.tabs.iter().map(|t| t.id).collect()
    }

    /// Get a tab by ID
    pub fn get_tab(&self, id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == id)
    }

    /// State of any tab ID this workspace has handed out.
    ///
    /// Returns `None` for IDs that were never allocated.
    pub fn tab_state(&self, id: TabId) -> Option<TabState> {
        match self.get_tab(id) {
            Some(tab) => Some(tab.state(self.active_tab_id == Some(id))),
            None if id >= 1 && id < self.next_tab_id => Some(TabState::Closed),
            None => None,
        }
    }

    /// Snapshot of the tab strip, in display order
    pub fn tab_strip(&self) -> Vec<TabStripEntry> {
        self.tabs
            .iter()
            .map(|t| t.strip_entry(self.active_tab_id == Some(t.id)))
            .collect()
    }

    /// The editor mounted in a tab
    pub fn editor(&self, id: TabId) -> Option<&dyn HostedEditor> {
        self.get_tab(id).and_then(Tab::editor)
    }

    /// Mutable access to the editor mounted in a tab
    pub fn editor_mut(&mut self, id: TabId) -> Option<&mut (dyn HostedEditor + 'static)> {
        self.tabs
            .iter_mut()
            .find(|t| t.id == id)
            .and_then(Tab::content_mut)
    }

    /// Number of requests whose completion has not been processed yet
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Apply every message already queued, without waiting.
    /// Returns the number of messages processed.
    pub fn process_pending(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(message) = self.mailbox_rx.try_recv() {
            self.handle_message(message);
            processed += 1;
        }
        processed
    }

    /// Wait for the next mailbox message.
    ///
    /// The manager keeps a sender alive, so this only resolves when something
    /// is posted; callers should check [`TabManager::in_flight`] first.
    pub async fn next_message(&mut self) -> Option<WorkspaceMessage> {
        self.mailbox_rx.recv().await
    }

    /// Wait for one message and apply it.
    pub async fn process_next(&mut self) {
        if let Some(message) = self.next_message().await {
            self.handle_message(message);
        }
    }

    /// Process messages until no request is in flight and the mailbox is empty.
    pub async fn settle(&mut self) {
        loop {
            self.process_pending();
            if self.in_flight() == 0 && self.mailbox_rx.is_empty() {
                break;
            }
            if self.in_flight() > 0 {
                self.process_next().await;
            }
        }
    }

    /// Apply one mailbox message.
    pub fn handle_message(&mut self, message: WorkspaceMessage) {
        match message {
            WorkspaceMessage::Close(id) => {
                // Stale closes are logged by close_by_handle and otherwise ignored
                let _ = self.close_by_handle(id);
            }
            WorkspaceMessage::Completion { tab_id, completion } => {
                self.request_finished();
                let label = completion.label();
                match self
                    .tabs
                    .iter_mut()
                    .find(|t| t.id == tab_id)
                    .and_then(Tab::content_mut)
                {
                    Some(editor) => {
                        log::debug!("Tab {}: delivering {} result", tab_id, label);
                        editor.on_completion(completion);
                    }
                    None => {
                        log::warn!(
                            "Tab {} is gone; discarding late {} response",
                            tab_id,
                            label
                        );
                    }
                }
            }
            WorkspaceMessage::Discarded { tab_id } => {
                self.request_finished();
                log::debug!("Tab {}: request finished after unmount", tab_id);
            }
        }
    }

    fn request_finished(&self) {
        let _ = self
            .in_flight
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
    }
}

/// Best-effort text of a panic payload.
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("editor panicked: {}", msg)
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("editor panicked: {}", msg)
    } else {
        "editor panicked".to_string()
    }
}
