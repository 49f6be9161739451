// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cfbot_core::{BranchId, FakeClock, TaskName};
use tempfile::tempdir;

#[test]
fn create_task_is_durable_across_reopen() {
    let dir = tempdir().unwrap();
    let branch_id = BranchId::new();
    let task_id = TaskId::new();
    let clock = FakeClock::new();

    {
        let mut store = Store::open(dir.path()).unwrap();
        let mut ledger = StoreLedger::new(&mut store, &clock);
        ledger.create_task(task_id, branch_id, TaskName::Download, 0).unwrap();
        assert_eq!(ledger.tasks_for_branch(branch_id).len(), 1);
    }

    let store = Store::open(dir.path()).unwrap();
    assert_eq!(store.state().tasks.get(&task_id).unwrap().branch_id, branch_id);
}

#[test]
fn clear_tasks_removes_every_task_for_the_branch() {
    let dir = tempdir().unwrap();
    let branch_id = BranchId::new();
    let clock = FakeClock::new();
    let mut store = Store::open(dir.path()).unwrap();
    let mut ledger = StoreLedger::new(&mut store, &clock);

    ledger.create_task(TaskId::new(), branch_id, TaskName::Download, 0).unwrap();
    ledger.create_task(TaskId::new(), branch_id, TaskName::Apply, 1).unwrap();
    assert_eq!(ledger.tasks_for_branch(branch_id).len(), 2);

    ledger.clear_tasks(branch_id).unwrap();
    assert!(ledger.tasks_for_branch(branch_id).is_empty());
}

#[test]
fn now_ms_reflects_the_injected_clock() {
    let dir = tempdir().unwrap();
    let clock = FakeClock::new();
    clock.set_epoch_ms(42);
    let mut store = Store::open(dir.path()).unwrap();
    let ledger = StoreLedger::new(&mut store, &clock);
    assert_eq!(ledger.now_ms(), 42);
}
