//! Generic create/edit editor for one backend collection.
//!
//! Every concrete editor in the portal (plugins, protocol adapters, tunnels,
//! ...) is this type bound to a different [`ResourceDescriptor`].

use super::{
    ActivationParams, EditorContext, EditorError, EditorKind, EditorState, HostedEditor,
    MountError, Notice, RequestCompletion, Requester, ResourceDescriptor,
};
use crate::tab::TabHandle;
use iot_portal_client::{ClientError, ControlAction, EntityRecord};
use serde_json::Value;

/// Which request the editor is waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Fetch,
    Save,
    Remove,
    Control,
}

pub struct EntityEditor {
    kind: EditorKind,
    descriptor: ResourceDescriptor,
    handle: TabHandle,
    requester: Requester,
    params: ActivationParams,
    record: EntityRecord,
    state: EditorState,
    pending: Option<Pending>,
    notice: Option<Notice>,
}

impl EntityEditor {
    /// Build the editor and give its tab the create title.
    pub fn new(kind: EditorKind, ctx: EditorContext) -> Self {
        let descriptor = kind.descriptor();
        ctx.handle.set_title(descriptor.create_title);
        Self {
            kind,
            descriptor,
            handle: ctx.handle,
            requester: ctx.requester,
            params: ctx.params,
            record: EntityRecord::new(),
            state: EditorState::Initializing,
            pending: None,
            notice: None,
        }
    }

    fn start_fetch(&mut self) {
        self.pending = Some(Pending::Fetch);
        self.requester.fetch(self.descriptor.segment, self.params.id);
    }

    /// Terminal step: the handle is closed exactly once, from here.
    fn finish(&mut self) {
        self.state = EditorState::Completed;
        self.handle.close();
    }

    fn on_loaded(&mut self, result: Result<EntityRecord, ClientError>) {
        if self.state != EditorState::Loading {
            log::warn!(
                "Tab {}: ignoring load result while {}",
                self.handle.tab_id(),
                self.state
            );
            return;
        }

        match result {
            Ok(mut record) => {
                if record.id().is_none() {
                    record.set_id(self.params.id);
                }
                self.record = record;
                self.state = EditorState::Ready;
                self.notice = None;
                self.handle.set_title(format!(
                    "{} #{}",
                    self.descriptor.edit_title, self.params.id
                ));
            }
            Err(e) => {
                log::warn!(
                    "Tab {}: failed to load {} #{}: {}",
                    self.handle.tab_id(),
                    self.descriptor.segment,
                    self.params.id,
                    e
                );
                self.notice = Some(Notice::Error(format!(
                    "Failed to load {} #{}: {}",
                    self.descriptor.segment, self.params.id, e
                )));
            }
        }
    }

    fn on_saved(&mut self, result: Result<(), ClientError>, verb: &str) {
        if self.state != EditorState::Submitting {
            log::warn!(
                "Tab {}: ignoring {} result while {}",
                self.handle.tab_id(),
                verb,
                self.state
            );
            return;
        }

        match result {
            Ok(()) => {
                log::info!(
                    "Tab {}: {} {} succeeded",
                    self.handle.tab_id(),
                    self.descriptor.segment,
                    verb
                );
                self.finish();
            }
            Err(e) => {
                log::warn!(
                    "Tab {}: {} {} failed: {}",
                    self.handle.tab_id(),
                    self.descriptor.segment,
                    verb,
                    e
                );
                self.state = EditorState::Ready;
                self.notice = Some(Notice::Error(format!("{} failed: {}", verb, e)));
            }
        }
    }

    /// A start or stop never closes the tab.
    fn on_controlled(&mut self, action: ControlAction, result: Result<(), ClientError>) {
        if self.state != EditorState::Submitting {
            log::warn!(
                "Tab {}: ignoring {} result while {}",
                self.handle.tab_id(),
                action,
                self.state
            );
            return;
        }

        self.state = EditorState::Ready;
        self.notice = Some(match result {
            Ok(()) => {
                let done = match action {
                    ControlAction::Start => "started",
                    ControlAction::Stop => "stopped",
                };
                log::info!("Tab {}: {} {}", self.handle.tab_id(), self.descriptor.segment, done);
                Notice::Info(format!("{} {}", self.descriptor.segment, done))
            }
            Err(e) => {
                log::warn!(
                    "Tab {}: {} {} failed: {}",
                    self.handle.tab_id(),
                    self.descriptor.segment,
                    action,
                    e
                );
                Notice::Error(format!("{} failed: {}", action, e))
            }
        });
    }
}

impl HostedEditor for EntityEditor {
    fn kind(&self) -> EditorKind {
        self.kind
    }

    fn state(&self) -> EditorState {
        self.state
    }

    fn mount(&mut self) -> Result<(), MountError> {
        if self.state != EditorState::Initializing {
            return Err(MountError::Init(format!("already {}", self.state)));
        }

        if self.params.id > 0 {
            self.state = EditorState::Loading;
            self.start_fetch();
        } else {
            self.record = self.params.preset.clone();
            self.state = EditorState::Ready;
        }
        Ok(())
    }

    fn on_completion(&mut self, completion: RequestCompletion) {
        self.pending = None;
        match completion {
            RequestCompletion::Loaded(result) => self.on_loaded(result),
            RequestCompletion::Saved(result) => {
                let result = result.map(|saved| {
                    if let Some(saved) = saved {
                        self.record = saved;
                    }
                });
                self.on_saved(result, "save");
            }
            RequestCompletion::Removed(result) => self.on_saved(result, "delete"),
            RequestCompletion::Controlled { action, result } => self.on_controlled(action, result),
        }
    }

    fn submit(&mut self) -> Result<(), EditorError> {
        match self.state {
            EditorState::Ready => {}
            EditorState::Submitting => return Err(EditorError::SubmitInFlight),
            other => return Err(EditorError::NotReady(other)),
        }

        self.state = EditorState::Submitting;
        self.notice = None;
        self.pending = Some(Pending::Save);

        let segment = self.descriptor.segment;
        match self.record.id() {
            Some(id) => {
                log::debug!("Tab {}: updating {}/{}", self.handle.tab_id(), segment, id);
                self.requester.update(segment, id, self.record.clone());
            }
            None => {
                log::debug!("Tab {}: creating {}", self.handle.tab_id(), segment);
                self.requester.create(segment, self.record.clone());
            }
        }
        Ok(())
    }

    fn cancel(&mut self) -> Result<(), EditorError> {
        match self.state {
            EditorState::Submitting => Err(EditorError::SubmitInFlight),
            EditorState::Completed => Err(EditorError::NotReady(EditorState::Completed)),
            _ => {
                self.finish();
                Ok(())
            }
        }
    }

    fn record(&self) -> &EntityRecord {
        &self.record
    }

    fn set_field(&mut self, key: &str, value: Value) -> Result<(), EditorError> {
        match self.state {
            EditorState::Ready => {
                self.record.set(key, value);
                Ok(())
            }
            EditorState::Submitting => Err(EditorError::SubmitInFlight),
            other => Err(EditorError::NotReady(other)),
        }
    }

    fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    fn reload(&mut self) -> Result<(), EditorError> {
        if self.state != EditorState::Loading {
            return Err(EditorError::NotReady(self.state));
        }
        if self.pending == Some(Pending::Fetch) {
            return Err(EditorError::FetchInFlight);
        }
        self.notice = None;
        self.start_fetch();
        Ok(())
    }

    fn delete(&mut self) -> Result<(), EditorError> {
        match self.state {
            EditorState::Ready => {}
            EditorState::Submitting => return Err(EditorError::SubmitInFlight),
            other => return Err(EditorError::NotReady(other)),
        }
        let Some(id) = self.record.id() else {
            return Err(EditorError::NotPersisted);
        };

        self.state = EditorState::Submitting;
        self.notice = None;
        self.pending = Some(Pending::Remove);
        self.requester.remove(self.descriptor.segment, id);
        Ok(())
    }

    fn control(&mut self, action: ControlAction) -> Result<(), EditorError> {
        if !self.descriptor.controllable {
            return Err(EditorError::Unsupported(action.as_str()));
        }
        match self.state {
            EditorState::Ready => {}
            EditorState::Submitting => return Err(EditorError::SubmitInFlight),
            other => return Err(EditorError::NotReady(other)),
        }
        let Some(id) = self.record.id() else {
            return Err(EditorError::NotPersisted);
        };

        self.state = EditorState::Submitting;
        self.notice = None;
        self.pending = Some(Pending::Control);
        self.requester.control(self.descriptor.segment, id, action);
        Ok(())
    }

    fn unmount(&mut self) {
        if let Some(pending) = self.pending.take() {
            log::warn!(
                "Tab {} closed with a {:?} request in flight; its response will be discarded",
                self.handle.tab_id(),
                pending
            );
        }
    }
}
