// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory [`Ledger`] used by `cfbot-adapters` and `cfbot-engine` unit
//! tests; gated behind the `test-support` feature so it never ships in a
//! production binary.

use crate::branch::BranchStatus;
use crate::ids::{ArtifactId, BranchId, CommandId, PatchId, TaskId};
use crate::ledger::Ledger;
use crate::task::{Artifact, Command, CommandType, Payload, Status, Task, TaskName};
use std::collections::HashMap;

/// A `Ledger` backed by plain `HashMap`s, with a settable clock and no
/// persistence. Branch status is tracked separately since `Ledger` only
/// needs to read/write the apply-result fields, not the full state machine.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    pub now_ms: u64,
    pub tasks: HashMap<TaskId, Task>,
    pub commands: HashMap<CommandId, Command>,
    pub artifacts: HashMap<ArtifactId, Artifact>,
    pub branch_statuses: HashMap<PatchId, BranchStatus>,
    pub apply_results: HashMap<PatchId, ApplyResultRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApplyResultRecord {
    pub patch_count: u32,
    pub first_patch_additions: u64,
    pub first_patch_deletions: u64,
    pub all_additions: u64,
    pub all_deletions: u64,
    pub commit_id: String,
    pub base_commit: String,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_now_ms(now_ms: u64) -> Self {
        Self { now_ms, ..Self::default() }
    }

    pub fn set_branch_status(&mut self, patch_id: PatchId, status: BranchStatus) {
        self.branch_statuses.insert(patch_id, status);
    }
}

impl Ledger for InMemoryLedger {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn tasks_for_branch(&self, branch_id: BranchId) -> Vec<Task> {
        let mut tasks: Vec<Task> = self.tasks.values().filter(|t| t.branch_id == branch_id).cloned().collect();
        tasks.sort_by_key(|t| t.position);
        tasks
    }

    fn first_task(&self, branch_id: BranchId, task_name: TaskName) -> Option<Task> {
        self.tasks_for_branch(branch_id).into_iter().find(|t| t.task_name == task_name)
    }

    fn commands_for_task(&self, task_id: TaskId, kind: Option<CommandType>) -> Vec<Command> {
        let mut commands: Vec<Command> = self
            .commands
            .values()
            .filter(|c| c.task_id == task_id && kind.map_or(true, |k| c.kind == k))
            .cloned()
            .collect();
        commands.sort_by(|a, b| a.name.cmp(&b.name));
        commands
    }

    fn create_task(
        &mut self,
        task_id: TaskId,
        branch_id: BranchId,
        task_name: TaskName,
        position: u32,
    ) -> crate::ledger::LedgerResult<()> {
        self.tasks.insert(task_id, Task::new(task_id, task_name, branch_id, position, self.now_ms));
        Ok(())
    }

    fn set_task_status(&mut self, task_id: TaskId, status: Status) -> crate::ledger::LedgerResult<()> {
        if let Some(task) = self.tasks.get_mut(&task_id) {
            task.set_status(status, self.now_ms);
        }
        Ok(())
    }

    fn set_task_payload(&mut self, task_id: TaskId, payload: Payload) -> crate::ledger::LedgerResult<()> {
        if let Some(task) = self.tasks.get_mut(&task_id) {
            task.payload = payload;
        }
        Ok(())
    }

    fn create_command(
        &mut self,
        command_id: CommandId,
        task_id: TaskId,
        name: String,
        kind: CommandType,
    ) -> crate::ledger::LedgerResult<()> {
        self.commands.insert(command_id, Command::new(command_id, task_id, name, kind));
        Ok(())
    }

    fn set_command_status(
        &mut self,
        command_id: CommandId,
        status: Status,
        duration_ms: Option<u64>,
    ) -> crate::ledger::LedgerResult<()> {
        if let Some(command) = self.commands.get_mut(&command_id) {
            command.status = status;
            command.duration_ms = duration_ms;
        }
        Ok(())
    }

    fn create_artifact(
        &mut self,
        artifact_id: ArtifactId,
        task_id: TaskId,
        name: String,
        path: String,
        size: u64,
    ) -> crate::ledger::LedgerResult<()> {
        self.artifacts.insert(artifact_id, Artifact::new(artifact_id, task_id, name, path, size));
        Ok(())
    }

    fn clear_tasks(&mut self, branch_id: BranchId) -> crate::ledger::LedgerResult<()> {
        let dead: Vec<TaskId> = self.tasks.values().filter(|t| t.branch_id == branch_id).map(|t| t.id).collect();
        for id in &dead {
            self.tasks.remove(id);
        }
        self.commands.retain(|_, c| !dead.contains(&c.task_id));
        self.artifacts.retain(|_, a| !dead.contains(&a.task_id));
        Ok(())
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
    ) -> crate::ledger::LedgerResult<()> {
        self.apply_results.insert(
            patch_id,
            ApplyResultRecord {
                patch_count,
                first_patch_additions,
                first_patch_deletions,
                all_additions,
                all_deletions,
                commit_id,
                base_commit,
            },
        );
        Ok(())
    }

    fn branch_status(&self, patch_id: PatchId) -> Option<BranchStatus> {
        self.branch_statuses.get(&patch_id).copied()
    }
}
