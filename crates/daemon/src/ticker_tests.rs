// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cfbot_adapters::{FakeDriver, FakeOutcome};
use cfbot_core::{BranchStatus, PatchId, SystemClock};
use cfbot_engine::{LoggingNotifier, PipelineEngine};
use cfbot_storage::Store;
use tempfile::tempdir;

fn new_app(dir: &std::path::Path) -> App {
    let store = Store::open(dir).unwrap();
    let engine = PipelineEngine::new(
        Box::new(FakeDriver::new(FakeOutcome::Succeed)),
        Box::new(FakeDriver::new(FakeOutcome::Succeed)),
        Box::new(FakeDriver::new(FakeOutcome::Succeed)),
        Box::new(LoggingNotifier),
        SystemClock,
    );
    App::new(store, engine, SystemClock)
}

#[tokio::test]
async fn one_tick_dequeues_and_advances_the_new_branch() {
    let dir = tempdir().unwrap();
    let app = Arc::new(Mutex::new(new_app(dir.path())));
    {
        let mut app = app.lock().await;
        app.enqueue_patch(PatchId::new(1), "<msg@example.com>".to_string()).unwrap();
    }

    let ticker = Ticker::new(Arc::clone(&app), Duration::from_millis(10));
    ticker.tick_once().await;

    let app = app.lock().await;
    let branches = app.branches();
    assert_eq!(branches.len(), 1);
    assert_eq!(branches[0].status, BranchStatus::Applying.to_string());
}

#[tokio::test]
async fn a_tick_against_an_empty_queue_is_a_no_op() {
    let dir = tempdir().unwrap();
    let app = Arc::new(Mutex::new(new_app(dir.path())));
    let ticker = Ticker::new(Arc::clone(&app), Duration::from_millis(10));
    ticker.tick_once().await;

    let app = app.lock().await;
    assert!(app.branches().is_empty());
}
