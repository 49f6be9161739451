// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The write/read surface stage drivers need against the Task Ledger,
//! without pulling in a dependency on `cfbot-storage` itself.
//!
//! `cfbot-adapters` implements `Applier`/`Compiler`/`Tester` against this
//! trait object rather than a concrete store, so stage drivers stay a pure
//! function of "ledger in, ledger mutated" and can be unit-tested against an
//! in-memory fake. `cfbot-storage::Store` is the real implementation,
//! translating every call into an `Event` appended to the WAL.

use crate::branch::BranchStatus;
use crate::ids::{ArtifactId, BranchId, CommandId, PatchId, TaskId};
use crate::task::{Command, CommandType, Payload, Status, Task, TaskName};
use thiserror::Error;

/// A mutating `Ledger` call failed to become durable (e.g. a WAL write
/// error). Stage drivers surface this the same way they surface any other
/// `EnvironmentError`: by returning `false`/`true` from `begin`/`did_fail`.
#[derive(Debug, Error)]
#[error("ledger write failed: {0}")]
pub struct LedgerError(pub String);

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Mutating and read access to Tasks/Commands/Artifacts for one Branch,
/// handed to a stage driver by the Engine for the duration of one call.
pub trait Ledger: Send + Sync {
    fn now_ms(&self) -> u64;

    fn tasks_for_branch(&self, branch_id: BranchId) -> Vec<Task>;

    /// First Task matching `(branch_id, task_name)`, in creation order.
    fn first_task(&self, branch_id: BranchId, task_name: TaskName) -> Option<Task>;

    /// Commands belonging to `task_id`, optionally filtered by type, ordered by name.
    fn commands_for_task(&self, task_id: TaskId, kind: Option<CommandType>) -> Vec<Command>;

    fn create_task(&mut self, task_id: TaskId, branch_id: BranchId, task_name: TaskName, position: u32) -> LedgerResult<()>;

    fn set_task_status(&mut self, task_id: TaskId, status: Status) -> LedgerResult<()>;

    fn set_task_payload(&mut self, task_id: TaskId, payload: Payload) -> LedgerResult<()>;

    fn create_command(&mut self, command_id: CommandId, task_id: TaskId, name: String, kind: CommandType) -> LedgerResult<()>;

    fn set_command_status(&mut self, command_id: CommandId, status: Status, duration_ms: Option<u64>) -> LedgerResult<()>;

    fn create_artifact(
        &mut self,
        artifact_id: ArtifactId,
        task_id: TaskId,
        name: String,
        path: String,
        size: u64,
    ) -> LedgerResult<()>;

    /// Clear every Task (and owned Commands/Artifacts) for `branch_id`; the
    /// Engine calls this before compile and test so each stage starts clean.
    fn clear_tasks(&mut self, branch_id: BranchId) -> LedgerResult<()>;

    /// Populate the Branch's apply-result fields (patch count, diff stats,
    /// commit ids) on a successful Applier sweep.
    #[allow(clippy::too_many_arguments)]
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
    ) -> LedgerResult<()>;

    fn branch_status(&self, patch_id: PatchId) -> Option<BranchStatus>;
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
