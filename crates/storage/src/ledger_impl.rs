// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cfbot_core::Ledger` for [`Store`]: every mutating call becomes one
//! `Event` appended to the WAL and folded into `MaterializedState`, so stage
//! drivers never touch the WAL directly and every Task/Command/Artifact
//! mutation they make is replay-safe for free.

use crate::store::Store;
use cfbot_core::ledger::{Ledger, LedgerError, LedgerResult};
use cfbot_core::{
    ArtifactId, BranchId, BranchStatus, Clock, Command, CommandType, Event, PatchId, Payload, Status, Task, TaskId,
    TaskName,
};

/// Borrows a [`Store`] and a [`Clock`] for the duration of one Engine step,
/// presenting the `Ledger` surface stage drivers are written against.
pub struct StoreLedger<'a, C: Clock> {
    store: &'a mut Store,
    clock: &'a C,
}

impl<'a, C: Clock> StoreLedger<'a, C> {
    pub fn new(store: &'a mut Store, clock: &'a C) -> Self {
        Self { store, clock }
    }

    fn apply(&mut self, event: Event) -> LedgerResult<()> {
        self.store.apply(event).map_err(|e| LedgerError(e.to_string()))
    }
}

impl<C: Clock> Ledger for StoreLedger<'_, C> {
    fn now_ms(&self) -> u64 {
        self.clock.epoch_ms()
    }

    fn tasks_for_branch(&self, branch_id: BranchId) -> Vec<Task> {
        let mut tasks: Vec<Task> =
            self.store.state().tasks.values().filter(|t| t.branch_id == branch_id).cloned().collect();
        tasks.sort_by_key(|t| t.position);
        tasks
    }

    fn first_task(&self, branch_id: BranchId, task_name: TaskName) -> Option<Task> {
        self.tasks_for_branch(branch_id).into_iter().find(|t| t.task_name == task_name)
    }

    fn commands_for_task(&self, task_id: TaskId, kind: Option<CommandType>) -> Vec<Command> {
        let mut commands: Vec<Command> = self
            .store
            .state()
            .commands
            .values()
            .filter(|c| c.task_id == task_id && kind.map_or(true, |k| c.kind == k))
            .cloned()
            .collect();
        commands.sort_by(|a, b| a.name.cmp(&b.name));
        commands
    }

    fn create_task(&mut self, task_id: TaskId, branch_id: BranchId, task_name: TaskName, position: u32) -> LedgerResult<()> {
        let at_ms = self.now_ms();
        self.apply(Event::TaskCreated { task_id, branch_id, task_name, position, at_ms })
    }

    fn set_task_status(&mut self, task_id: TaskId, status: Status) -> LedgerResult<()> {
        let at_ms = self.now_ms();
        self.apply(Event::TaskStatusChanged { task_id, status, at_ms })
    }

    fn set_task_payload(&mut self, task_id: TaskId, payload: Payload) -> LedgerResult<()> {
        self.apply(Event::TaskPayloadSet { task_id, payload })
    }

    fn create_command(&mut self, command_id: cfbot_core::CommandId, task_id: TaskId, name: String, kind: CommandType) -> LedgerResult<()> {
        self.apply(Event::CommandCreated { command_id, task_id, name, kind })
    }

    fn set_command_status(
        &mut self,
        command_id: cfbot_core::CommandId,
        status: Status,
        duration_ms: Option<u64>,
    ) -> LedgerResult<()> {
        self.apply(Event::CommandStatusChanged { command_id, status, duration_ms })
    }

    fn create_artifact(
        &mut self,
        artifact_id: ArtifactId,
        task_id: TaskId,
        name: String,
        path: String,
        size: u64,
    ) -> LedgerResult<()> {
        self.apply(Event::ArtifactCreated { artifact_id, task_id, name, path, size })
    }

    fn clear_tasks(&mut self, branch_id: BranchId) -> LedgerResult<()> {
        self.apply(Event::TasksCleared { branch_id })
    }

    fn record_apply_result(
        &mut self,
        patch_id: PatchId,
        patch_count: u32,
        first_patch_additions: u64,
        first_patch_deletions: u64,
        all_additions: u64,
        all_deletions: u64,
        commit_id: String,
        base_commit: String,
    ) -> LedgerResult<()> {
        self.apply(Event::BranchApplyResultRecorded {
            patch_id,
            patch_count,
            first_patch_stat: cfbot_core::DiffStat { additions: first_patch_additions, deletions: first_patch_deletions },
            all_patches_stat: cfbot_core::DiffStat { additions: all_additions, deletions: all_deletions },
            commit_id,
            base_commit,
        })
    }

    fn branch_status(&self, patch_id: PatchId) -> Option<BranchStatus> {
        self.store.state().branches.get(&patch_id).map(|b| b.status)
    }
}

#[cfg(test)]
#[path = "ledger_impl_tests.rs"]
mod tests;
