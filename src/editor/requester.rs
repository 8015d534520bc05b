//! Spawns entity requests on behalf of one tab and routes their results back.
//!
//! Each request runs as a tokio task. When it finishes, the task checks the
//! tab's mounted flag: a live tab receives a [`RequestCompletion`] through the
//! workspace mailbox, an unmounted one only gets a `Discarded` notice so the
//! in-flight count stays correct.

use crate::tab::TabId;
use crate::tab::mailbox::WorkspaceMessage;
use iot_portal_client::{ClientError, ControlAction, EntityClient, EntityRecord, resource_path};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;

/// Result of one request, as delivered to the editor that started it.
#[derive(Debug)]
pub enum RequestCompletion {
    /// `fetch` finished
    Loaded(Result<EntityRecord, ClientError>),
    /// `create` or `update` finished; `None` when the backend did not echo the record
    Saved(Result<Option<EntityRecord>, ClientError>),
    /// `remove` finished
    Removed(Result<(), ClientError>),
    /// `start` or `stop` finished
    Controlled {
        action: ControlAction,
        result: Result<(), ClientError>,
    },
}

impl RequestCompletion {
    /// Short label for log messages
    pub fn label(&self) -> &'static str {
        match self {
            RequestCompletion::Loaded(_) => "load",
            RequestCompletion::Saved(_) => "save",
            RequestCompletion::Removed(_) => "remove",
            RequestCompletion::Controlled { action, .. } => action.as_str(),
        }
    }
}

/// Per-tab request launcher handed to a hosted editor.
#[derive(Clone)]
pub struct Requester {
    tab_id: TabId,
    client: EntityClient,
    mailbox: UnboundedSender<WorkspaceMessage>,
    in_flight: Arc<AtomicUsize>,
    mounted: Arc<AtomicBool>,
    runtime: Handle,
}

impl Requester {
    pub(crate) fn new(
        tab_id: TabId,
        client: EntityClient,
        mailbox: UnboundedSender<WorkspaceMessage>,
        in_flight: Arc<AtomicUsize>,
        mounted: Arc<AtomicBool>,
        runtime: Handle,
    ) -> Self {
        Self {
            tab_id,
            client,
            mailbox,
            in_flight,
            mounted,
            runtime,
        }
    }

    /// `GET {segment}/{id}`; completes with [`RequestCompletion::Loaded`].
    pub fn fetch(&self, segment: &'static str, id: u64) {
        let client = self.client.clone();
        let path = resource_path(segment, id);
        self.spawn(async move { RequestCompletion::Loaded(client.fetch(&path).await) });
    }

    /// `POST {segment}`; completes with [`RequestCompletion::Saved`].
    pub fn create(&self, segment: &'static str, record: EntityRecord) {
        let client = self.client.clone();
        self.spawn(async move { RequestCompletion::Saved(client.create(segment, &record).await) });
    }

    /// `PUT {segment}/{id}`; completes with [`RequestCompletion::Saved`].
    pub fn update(&self, segment: &'static str, id: u64, record: EntityRecord) {
        let client = self.client.clone();
        self.spawn(async move {
            RequestCompletion::Saved(client.update(segment, id, &record).await)
        });
    }

    /// `DELETE {segment}/{id}`; completes with [`RequestCompletion::Removed`].
    pub fn remove(&self, segment: &'static str, id: u64) {
        let client = self.client.clone();
        self.spawn(async move { RequestCompletion::Removed(client.remove(segment, id).await) });
    }

    /// `GET {segment}/{id}/{action}`; completes with [`RequestCompletion::Controlled`].
    pub fn control(&self, segment: &'static str, id: u64, action: ControlAction) {
        let client = self.client.clone();
        self.spawn(async move {
            let result = client.control(segment, id, action).await;
            RequestCompletion::Controlled { action, result }
        });
    }

    fn spawn<F>(&self, request: F)
    where
        F: Future<Output = RequestCompletion> + Send + 'static,
    {
        self.in_flight.fetch_add(1, Ordering::AcqRel);

        let tab_id = self.tab_id;
        let mailbox = self.mailbox.clone();
        let mounted = Arc::clone(&self.mounted);

        self.runtime.spawn(async move {
            let completion = request.await;

            let message = if mounted.load(Ordering::Acquire) {
                WorkspaceMessage::Completion { tab_id, completion }
            } else {
                log::debug!(
                    "Tab {} unmounted before its {} finished; dropping result",
                    tab_id,
                    completion.label()
                );
                WorkspaceMessage::Discarded { tab_id }
            };

            if mailbox.send(message).is_err() {
                log::debug!("Workspace dropped before tab {} request finished", tab_id);
            }
        });
    }
}
