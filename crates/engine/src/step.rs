// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `PipelineEngine::step`: one tick of the apply → compile → test → notify
//! state machine (§4.2), driven by three pluggable stage drivers plus a
//! notifier hook.

use crate::driver::StageDriver;
use crate::error::EngineError;
use crate::notifier::Notifier;
use cfbot_core::{
    Branch, BranchHistoryId, BranchHistoryRecord, BranchId, BranchStatus, Clock, Event, PatchId, TaskHistoryEntry,
};
use cfbot_storage::{Store, StoreLedger};
use std::time::Duration;

/// Which of the three pipeline stages a transition concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Apply,
    Compile,
    Test,
}

impl Stage {
    fn begin_status(self) -> BranchStatus {
        match self {
            Stage::Apply => BranchStatus::Applying,
            Stage::Compile => BranchStatus::Compiling,
            Stage::Test => BranchStatus::Testing,
        }
    }

    fn aborted_status(self) -> BranchStatus {
        match self {
            Stage::Apply => BranchStatus::ApplyingAborted,
            Stage::Compile => BranchStatus::CompilingAborted,
            Stage::Test => BranchStatus::TestingAborted,
        }
    }

    fn failed_status(self) -> BranchStatus {
        match self {
            Stage::Apply => BranchStatus::ApplyingFailed,
            Stage::Compile => BranchStatus::CompilingFailed,
            Stage::Test => BranchStatus::TestingFailed,
        }
    }

    fn done_status(self) -> BranchStatus {
        match self {
            Stage::Apply => BranchStatus::Applied,
            Stage::Compile => BranchStatus::Compiled,
            Stage::Test => BranchStatus::Tested,
        }
    }
}

/// Outcome of one [`PipelineEngine::step`] call: the Branch after the
/// transition (and any Notifier side effects), and how long the caller
/// should wait before ticking it again.
#[derive(Debug, Clone)]
pub struct StepResult {
    pub branch: Branch,
    pub delay: Option<Duration>,
}

/// Drives one Branch at a time through apply → compile → test → notify.
///
/// Holds the three stage drivers and the outbound Notifier hook; the Task
/// Ledger and Branch/Queue state live in the `Store` passed to each `step`
/// call, not in the engine itself, so one `PipelineEngine` can drive many
/// Branches (serialized per-Branch by the caller; see §5).
pub struct PipelineEngine<Clk: Clock> {
    applier: Box<dyn StageDriver>,
    compiler: Box<dyn StageDriver>,
    tester: Box<dyn StageDriver>,
    notifier: Box<dyn Notifier>,
    clock: Clk,
}

impl<Clk: Clock> PipelineEngine<Clk> {
    pub fn new(
        applier: Box<dyn StageDriver>,
        compiler: Box<dyn StageDriver>,
        tester: Box<dyn StageDriver>,
        notifier: Box<dyn Notifier>,
        clock: Clk,
    ) -> Self {
        Self { applier, compiler, tester, notifier, clock }
    }

    fn driver(&self, stage: Stage) -> &dyn StageDriver {
        match stage {
            Stage::Apply => self.applier.as_ref(),
            Stage::Compile => self.compiler.as_ref(),
            Stage::Test => self.tester.as_ref(),
        }
    }

    /// Advance `patch_id`'s Branch exactly one transition.
    pub async fn step(&mut self, store: &mut Store, patch_id: PatchId) -> Result<StepResult, EngineError> {
        let initial_status = self.branch(store, patch_id)?.status;

        let delay = match initial_status {
            BranchStatus::New => self.handle_begin(store, patch_id, Stage::Apply).await?,
            BranchStatus::Applied => {
                let branch_id = self.branch(store, patch_id)?.branch_id;
                self.clear_tasks(store, branch_id)?;
                self.handle_begin(store, patch_id, Stage::Compile).await?
            }
            BranchStatus::Compiled => {
                let branch_id = self.branch(store, patch_id)?.branch_id;
                self.clear_tasks(store, branch_id)?;
                self.handle_begin(store, patch_id, Stage::Test).await?
            }
            BranchStatus::Applying => self.handle_progress(store, patch_id, Stage::Apply).await?,
            BranchStatus::Compiling => self.handle_progress(store, patch_id, Stage::Compile).await?,
            BranchStatus::Testing => self.handle_progress(store, patch_id, Stage::Test).await?,
            BranchStatus::Tested => {
                self.set_status(store, patch_id, BranchStatus::Notifying)?;
                let branch = self.branch(store, patch_id)?;
                self.notifier.branch_tested(&branch).await;
                self.set_status(store, patch_id, BranchStatus::Finished)?;
                None
            }
            other if other.is_terminal() => None,
            other => return Err(EngineError::InvalidState { patch_id, status: other }),
        };

        let final_status = self.branch(store, patch_id)?.status;
        self.apply_branch_updated_side_effects(store, patch_id, final_status)?;
        self.append_history(store, patch_id, final_status)?;

        Ok(StepResult { branch: self.branch(store, patch_id)?, delay })
    }

    async fn handle_begin(&mut self, store: &mut Store, patch_id: PatchId, stage: Stage) -> Result<Option<Duration>, EngineError> {
        let branch = self.branch(store, patch_id)?;
        let began = {
            let mut ledger = StoreLedger::new(store, &self.clock);
            self.driver(stage).begin(&mut ledger, &branch).await
        };
        if began {
            self.set_status(store, patch_id, stage.begin_status())?;
        } else {
            self.set_status(store, patch_id, stage.aborted_status())?;
        }
        Ok(None)
    }

    async fn handle_progress(&mut self, store: &mut Store, patch_id: PatchId, stage: Stage) -> Result<Option<Duration>, EngineError> {
        let branch = self.branch(store, patch_id)?;
        let is_done = {
            let mut ledger = StoreLedger::new(store, &self.clock);
            self.driver(stage).is_done(&mut ledger, &branch).await
        };
        if !is_done {
            return Ok(self.driver(stage).get_delay(&branch));
        }

        let failed = {
            let mut ledger = StoreLedger::new(store, &self.clock);
            self.driver(stage).did_fail(&mut ledger, &branch).await
        };
        if failed {
            self.set_status(store, patch_id, stage.failed_status())?;
        } else {
            self.set_status(store, patch_id, stage.done_status())?;
        }
        Ok(None)
    }

    fn branch(&self, store: &Store, patch_id: PatchId) -> Result<Branch, EngineError> {
        store.state().branches.get(&patch_id).cloned().ok_or(EngineError::BranchNotFound(patch_id))
    }

    fn set_status(&self, store: &mut Store, patch_id: PatchId, status: BranchStatus) -> Result<(), EngineError> {
        let at_ms = self.clock.epoch_ms();
        store.apply(Event::BranchStatusChanged { patch_id, status, at_ms })?;
        Ok(())
    }

    fn clear_tasks(&self, store: &mut Store, branch_id: BranchId) -> Result<(), EngineError> {
        store.apply(Event::TasksCleared { branch_id })?;
        Ok(())
    }

    /// §4.3 `Notifier.branchUpdated`'s deterministic side effects: queue
    /// ignore-marking and needs-rebase/failing bookkeeping. Not pluggable —
    /// unlike `branchTested`, this is specified core behavior, not an
    /// external collaborator.
    fn apply_branch_updated_side_effects(&self, store: &mut Store, patch_id: PatchId, status: BranchStatus) -> Result<(), EngineError> {
        let at_ms = self.clock.epoch_ms();
        let queue_item_id = store.state().queue.find_by_patch(patch_id);

        match status {
            BranchStatus::CompilingAborted | BranchStatus::CompilingFailed => {
                store.apply(Event::BranchNeedsRebaseSet { patch_id, at_ms })?;
                store.apply(Event::BranchFailingSet { patch_id, at_ms })?;
                if let Some(item_id) = queue_item_id {
                    store.apply(Event::QueueItemIgnored { item_id, at_ms })?;
                }
            }
            BranchStatus::TestingAborted | BranchStatus::TestingFailed => {
                store.apply(Event::BranchNeedsRebaseCleared { patch_id })?;
                store.apply(Event::BranchFailingSet { patch_id, at_ms })?;
                if let Some(item_id) = queue_item_id {
                    store.apply(Event::QueueItemIgnored { item_id, at_ms })?;
                }
            }
            _ => {}
        }

        if matches!(status, BranchStatus::Compiled | BranchStatus::CompilingFailed) {
            if let Some(item_id) = queue_item_id {
                let base_commit = store.state().branches.get(&patch_id).and_then(|b| b.base_commit.clone());
                if let Some(base_commit) = base_commit {
                    store.apply(Event::QueueItemBaseCommitSet { item_id, base_commit })?;
                }
            }
        }

        Ok(())
    }

    /// The sole source of BranchHistory rows: one per `step` call.
    fn append_history(&self, store: &mut Store, patch_id: PatchId, status: BranchStatus) -> Result<(), EngineError> {
        let branch = self.branch(store, patch_id)?;
        let tasks: Vec<TaskHistoryEntry> = store
            .state()
            .tasks
            .values()
            .filter(|t| t.branch_id == branch.branch_id)
            .map(|t| TaskHistoryEntry {
                task_id: t.id,
                task_name: t.task_name,
                status: t.status,
                created_ms: t.created_ms,
                modified_ms: t.modified_ms,
                payload: t.payload.clone(),
            })
            .collect();

        let record = BranchHistoryRecord {
            id: BranchHistoryId::new(),
            patch_id,
            status,
            task_count: tasks.len() as u32,
            tasks,
            recorded_ms: self.clock.epoch_ms(),
        };
        store.apply(Event::BranchHistoryAppended { record })?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "step_tests.rs"]
mod tests;
