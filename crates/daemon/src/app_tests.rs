// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cfbot_adapters::{FakeDriver, FakeOutcome};
use cfbot_core::BranchStatus;
use cfbot_engine::LoggingNotifier;
use tempfile::tempdir;

fn new_app(dir: &std::path::Path, outcome: FakeOutcome) -> App {
    let store = Store::open(dir).unwrap();
    let engine = PipelineEngine::new(
        Box::new(FakeDriver::new(outcome)),
        Box::new(FakeDriver::new(outcome)),
        Box::new(FakeDriver::new(outcome)),
        Box::new(LoggingNotifier),
        SystemClock,
    );
    App::new(store, engine, SystemClock)
}

#[test]
fn enqueue_then_peek_round_trips_the_patch_id() {
    let dir = tempdir().unwrap();
    let mut app = new_app(dir.path(), FakeOutcome::Succeed);
    app.enqueue_patch(PatchId::new(42), "<msg-1@example.com>".to_string()).unwrap();

    let item = app.peek().expect("queue item present");
    assert_eq!(item.patch_id, 42);
    assert_eq!(app.get_queue().len(), 1);
}

#[test]
fn get_and_move_creates_a_branch_for_the_dequeued_patch() {
    let dir = tempdir().unwrap();
    let mut app = new_app(dir.path(), FakeOutcome::Succeed);
    app.enqueue_patch(PatchId::new(7), "<msg@example.com>".to_string()).unwrap();

    // A single-item ring has no neighbor to advance to, so the cursor wraps
    // back onto the same item: both halves of the pair name patch 7.
    let (returned, new_current) = app.get_and_move().unwrap();
    assert_eq!(returned.unwrap().patch_id, 7);
    assert_eq!(new_current.unwrap().patch_id, 7);

    let branches = app.branches();
    assert_eq!(branches.len(), 1);
    assert_eq!(branches[0].patch_id, 7);
    assert_eq!(branches[0].status, BranchStatus::New.to_string());
}

#[tokio::test]
async fn process_branch_steps_the_pipeline_once() {
    let dir = tempdir().unwrap();
    let mut app = new_app(dir.path(), FakeOutcome::Succeed);
    app.enqueue_patch(PatchId::new(1), "<msg@example.com>".to_string()).unwrap();
    app.get_and_move().unwrap();

    let branch_id = BranchId::from_string(&app.branches()[0].branch_id);
    let response = app.process_branch(branch_id).await.unwrap();
    match response {
        Response::Stepped { branch, .. } => assert_eq!(branch.status, BranchStatus::Applying.to_string()),
        other => panic!("unexpected response: {other:?}"),
    }

    let history = app.branch_history(branch_id);
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn process_branch_reports_not_found_for_an_unknown_branch_id() {
    let dir = tempdir().unwrap();
    let mut app = new_app(dir.path(), FakeOutcome::Succeed);
    let err = app.process_branch(BranchId::new()).await.unwrap_err();
    assert!(matches!(err, DaemonError::BranchNotFound(_)));
}

#[tokio::test]
async fn tick_advances_every_non_terminal_branch() {
    let dir = tempdir().unwrap();
    let mut app = new_app(dir.path(), FakeOutcome::Succeed);
    app.enqueue_patch(PatchId::new(1), "<a@example.com>".to_string()).unwrap();
    app.enqueue_patch(PatchId::new(2), "<b@example.com>".to_string()).unwrap();
    app.get_and_move().unwrap();
    app.get_and_move().unwrap();

    let stepped = app.tick().await.unwrap();
    assert_eq!(stepped, 2);
    for branch in app.branches() {
        assert_eq!(branch.status, BranchStatus::Applying.to_string());
    }
}
