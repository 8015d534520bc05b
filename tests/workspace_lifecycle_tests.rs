//! Tab workspace lifecycle tests
//!
//! Covers opening and closing tabs, active-tab reselection, handle close
//! requests (including stale ones), mount failure isolation and responses
//! that arrive after their tab is gone.

mod common;

use common::{RecordingTransport, failing_registry, stub_registry, workspace, workspace_with};
use iot_portal::{ActivationParams, EditorKind, EditorState, TabState, WorkspaceError};
use iot_portal_client::Method;

// ============================================================================
// Sequence and selection
// ============================================================================

#[tokio::test]
async fn test_open_appends_and_activates() {
    let mut ws = workspace(RecordingTransport::new());

    let a = ws.open(EditorKind::Plugin, ActivationParams::create());
    let b = ws.open(EditorKind::Tunnel, ActivationParams::create());

    assert_ne!(a, b);
    assert_eq!(ws.tab_ids(), vec![a, b]);
    assert_eq!(ws.active_tab_id(), Some(b));
    assert_eq!(ws.tab_state(a), Some(TabState::Inactive));
    assert_eq!(ws.tab_state(b), Some(TabState::Active));
}

#[tokio::test]
async fn test_tab_count_tracks_opens_minus_closes() {
    let mut ws = workspace(RecordingTransport::new());
    let mut opened = 0;
    let mut closed = 0;

    let mut ids = Vec::new();
    for kind in EditorKind::all() {
        ids.push(ws.open(*kind, ActivationParams::create()));
        opened += 1;
        assert_eq!(ws.tab_count(), opened - closed);
    }
    for id in ids.iter().step_by(2) {
        ws.close_tab(*id).unwrap();
        closed += 1;
        assert_eq!(ws.tab_count(), opened - closed);
    }

    // Exactly one tab is active whenever any tab is open
    let active: Vec<_> = ws.tab_strip().into_iter().filter(|e| e.active).collect();
    assert_eq!(active.len(), 1);
}

#[tokio::test]
async fn test_tab_ids_are_never_reused() {
    let mut ws = workspace(RecordingTransport::new());
    let a = ws.open(EditorKind::Link, ActivationParams::create());
    ws.close_tab(a).unwrap();

    let b = ws.open(EditorKind::Link, ActivationParams::create());

    assert!(b > a);
    assert_eq!(ws.tab_state(a), Some(TabState::Closed));
}

#[tokio::test]
async fn test_closing_active_tab_activates_predecessor() {
    let mut ws = workspace(RecordingTransport::new());
    let a = ws.open(EditorKind::Plugin, ActivationParams::create());
    let b = ws.open(EditorKind::Plugin, ActivationParams::create());
    let c = ws.open(EditorKind::Plugin, ActivationParams::create());

    ws.activate(b).unwrap();
    ws.close_tab(b).unwrap();

    assert_eq!(ws.active_tab_id(), Some(a));
    assert_eq!(ws.tab_ids(), vec![a, c]);
}

#[tokio::test]
async fn test_closing_inactive_tab_keeps_active_tab() {
    let mut ws = workspace(RecordingTransport::new());
    let a = ws.open(EditorKind::Plugin, ActivationParams::create());
    let b = ws.open(EditorKind::Plugin, ActivationParams::create());

    ws.close_tab(a).unwrap();

    assert_eq!(ws.active_tab_id(), Some(b));
}

#[tokio::test]
async fn test_closing_only_tab_leaves_nothing_active() {
    let mut ws = workspace(RecordingTransport::new());
    let a = ws.open(EditorKind::Device, ActivationParams::create());

    ws.close_tab(a).unwrap();

    assert_eq!(ws.tab_count(), 0);
    assert_eq!(ws.active_tab_id(), None);
    assert!(ws.tab_strip().is_empty());
}

#[tokio::test]
async fn test_activate_unknown_tab_is_rejected_without_side_effects() {
    let mut ws = workspace(RecordingTransport::new());
    let a = ws.open(EditorKind::Plugin, ActivationParams::create());
    let b = ws.open(EditorKind::Plugin, ActivationParams::create());
    ws.close_tab(a).unwrap();

    assert_eq!(ws.activate(a), Err(WorkspaceError::UnknownTab(a)));
    assert_eq!(ws.activate(999), Err(WorkspaceError::UnknownTab(999)));
    assert_eq!(ws.close_tab(999), Err(WorkspaceError::UnknownTab(999)));

    assert_eq!(ws.tab_ids(), vec![b]);
    assert_eq!(ws.active_tab_id(), Some(b));
}

#[tokio::test]
async fn test_activate_already_active_is_noop() {
    let mut ws = workspace(RecordingTransport::new());
    let a = ws.open(EditorKind::Plugin, ActivationParams::create());

    ws.activate(a).unwrap();

    assert_eq!(ws.active_tab_id(), Some(a));
}

// ============================================================================
// Handle close requests
// ============================================================================

#[tokio::test]
async fn test_handle_close_removes_tab_once_and_second_close_is_stale() {
    let (registry, handles) = stub_registry(EditorKind::Model);
    let mut ws = workspace_with(registry, RecordingTransport::new());
    let a = ws.open(EditorKind::Plugin, ActivationParams::create());
    let opened = ws.open(EditorKind::Model, ActivationParams::create());
    let handle = handles.lock()[0].clone();
    assert_eq!(handle.tab_id(), opened);
    assert!(handle.is_mounted());

    handle.close();
    handle.close();
    ws.process_pending();

    assert_eq!(ws.tab_ids(), vec![a]);
    assert_eq!(ws.active_tab_id(), Some(a));
    assert!(!handle.is_mounted());
    assert_eq!(
        ws.close_by_handle(opened),
        Err(WorkspaceError::StaleHandle(opened))
    );
}

#[tokio::test]
async fn test_handle_title_is_visible_in_tab_strip() {
    let (registry, handles) = stub_registry(EditorKind::Link);
    let mut ws = workspace_with(registry, RecordingTransport::new());
    let id = ws.open(EditorKind::Link, ActivationParams::create());

    handles.lock()[0].set_title("Edit Link #3");

    let strip = ws.tab_strip();
    assert_eq!(strip[0].id, id);
    assert_eq!(strip[0].title, "Edit Link #3");
}

// ============================================================================
// Mount failures
// ============================================================================

#[tokio::test]
async fn test_mount_failure_is_contained_to_its_tab() {
    let mut ws = workspace_with(failing_registry(EditorKind::Device), RecordingTransport::new());
    let a = ws.open(EditorKind::Plugin, ActivationParams::create());

    let broken = ws.open(EditorKind::Device, ActivationParams::edit(4));

    assert_eq!(ws.tab_count(), 2);
    assert_eq!(ws.active_tab_id(), Some(broken));
    assert_eq!(ws.tab_state(broken), Some(TabState::Failed));
    assert!(ws.editor(broken).is_none());
    assert_eq!(
        ws.editor(a).map(|e| e.state()),
        Some(EditorState::Ready),
        "sibling tab must be untouched"
    );

    // A failed tab can still be closed from the strip
    ws.close_tab(broken).unwrap();
    assert_eq!(ws.active_tab_id(), Some(a));
}

// ============================================================================
// Late responses
// ============================================================================

#[tokio::test]
async fn test_response_after_user_close_is_discarded() {
    let transport = RecordingTransport::new();
    transport.hold();
    let mut ws = workspace(transport.clone());
    let keep = ws.open(EditorKind::Plugin, ActivationParams::create());
    let doomed = ws.open(EditorKind::Plugin, ActivationParams::edit(7));
    assert_eq!(ws.in_flight(), 1);

    ws.close_tab(doomed).unwrap();
    transport.release();
    ws.settle().await;

    assert_eq!(ws.in_flight(), 0);
    assert_eq!(ws.tab_ids(), vec![keep]);
    assert_eq!(transport.count(Method::Get, "plugin/7"), 1);
}

#[tokio::test]
async fn test_close_during_submit_discards_the_save_result() {
    let transport = RecordingTransport::new();
    let mut ws = workspace(transport.clone());
    let id = ws.open(EditorKind::Tunnel, ActivationParams::create());

    transport.hold();
    ws.editor_mut(id).unwrap().submit().unwrap();
    ws.close_tab(id).unwrap();
    transport.release();
    ws.settle().await;

    assert_eq!(ws.tab_count(), 0);
    assert_eq!(transport.count(Method::Post, "tunnel"), 1);
    assert_eq!(ws.tab_state(id), Some(TabState::Closed));
}

// ============================================================================
// End-to-end scenario
// ============================================================================

#[tokio::test]
async fn test_create_then_close_sequence_scenario() {
    let transport = RecordingTransport::new();
    let mut ws = workspace(transport.clone());

    // Tab A: create, submit, removed on success
    let a = ws.open(EditorKind::Plugin, ActivationParams::create());
    ws.editor_mut(a).unwrap().submit().unwrap();
    ws.settle().await;

    assert_eq!(ws.tab_count(), 0);
    assert_eq!(ws.active_tab_id(), None);
    assert_eq!(transport.count(Method::Post, "plugin"), 1);

    // Tabs B and C: C is active; closing C hands focus back to B
    let b = ws.open(EditorKind::Plugin, ActivationParams::create());
    let c = ws.open(EditorKind::Plugin, ActivationParams::create());
    assert_eq!(ws.active_tab_id(), Some(c));

    ws.close_tab(c).unwrap();

    assert_eq!(ws.active_tab_id(), Some(b));
    assert_eq!(ws.tab_ids(), vec![b]);
}
