//! Messages delivered to the workspace from handles and request tasks.
//!
//! Everything that reaches a tab from outside the owning thread goes
//! through this queue, so tab state is only ever mutated by the workspace.

use super::TabId;
use crate::editor::RequestCompletion;

#[derive(Debug)]
pub enum WorkspaceMessage {
    /// A [`super::TabHandle`] asked for its tab to be closed.
    Close(TabId),
    /// A request started by the tab's editor finished.
    Completion {
        tab_id: TabId,
        completion: RequestCompletion,
    },
    /// A request finished after its tab was unmounted; the result was dropped.
    Discarded { tab_id: TabId },
}
