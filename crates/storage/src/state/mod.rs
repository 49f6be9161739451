// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The materialized state: everything [`cfbot_core::Event`]s fold into.
//!
//! `apply_event` is the single entry point. Every arm is idempotent against
//! a replay of the same event with the same arguments, because every event
//! variant carries only caller-chosen inputs and never derived state (see
//! `cfbot_core::event`'s module doc) — reapplying it recomputes the same
//! outcome rather than double-counting it.

mod branch;
mod queue;
mod task;

use cfbot_core::{
    Artifact, Branch, BranchHistoryRecord, Command, CommandId, Event, PatchId, QueueRing, Task, TaskId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterializedState {
    pub queue: QueueRing,
    pub branches: HashMap<PatchId, Branch>,
    pub tasks: HashMap<TaskId, Task>,
    pub commands: HashMap<CommandId, Command>,
    pub artifacts: HashMap<cfbot_core::ArtifactId, Artifact>,
    pub branch_history: Vec<BranchHistoryRecord>,
}

impl MaterializedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_event(&mut self, event: &Event) {
        match event {
            Event::QueueItemInserted { item_id, patch_id, message_id, at_ms } => {
                queue::item_inserted(self, *item_id, *patch_id, message_id, *at_ms);
            }
            Event::QueueItemRemoved { item_id } => queue::item_removed(self, *item_id),
            Event::QueueAdvanced { at_ms } => queue::advanced(self, *at_ms),
            Event::QueueItemIgnored { item_id, at_ms } => queue::item_ignored(self, *item_id, *at_ms),
            Event::QueueItemBaseCommitSet { item_id, base_commit } => {
                queue::item_base_commit_set(self, *item_id, base_commit);
            }

            Event::BranchCreated { patch_id, branch_id, branch_name, at_ms } => {
                branch::created(self, *patch_id, *branch_id, branch_name, *at_ms);
            }
            Event::BranchStatusChanged { patch_id, status, at_ms } => {
                branch::status_changed(self, *patch_id, *status, *at_ms);
            }
            Event::BranchApplyResultRecorded {
                patch_id,
                patch_count,
                first_patch_stat,
                all_patches_stat,
                commit_id,
                base_commit,
            } => {
                branch::apply_result_recorded(
                    self,
                    *patch_id,
                    *patch_count,
                    *first_patch_stat,
                    *all_patches_stat,
                    commit_id,
                    base_commit,
                );
            }
            Event::BranchNeedsRebaseSet { patch_id, at_ms } => branch::needs_rebase_set(self, *patch_id, *at_ms),
            Event::BranchNeedsRebaseCleared { patch_id } => branch::needs_rebase_cleared(self, *patch_id),
            Event::BranchFailingSet { patch_id, at_ms } => branch::failing_set(self, *patch_id, *at_ms),
            Event::BranchFailingCleared { patch_id } => branch::failing_cleared(self, *patch_id),

            Event::TasksCleared { branch_id } => task::tasks_cleared(self, *branch_id),
            Event::TaskCreated { task_id, branch_id, task_name, position, at_ms } => {
                task::task_created(self, *task_id, *branch_id, *task_name, *position, *at_ms);
            }
            Event::TaskStatusChanged { task_id, status, at_ms } => task::task_status_changed(self, *task_id, *status, *at_ms),
            Event::TaskPayloadSet { task_id, payload } => task::task_payload_set(self, *task_id, payload.clone()),

            Event::CommandCreated { command_id, task_id, name, kind } => {
                task::command_created(self, *command_id, *task_id, name, *kind);
            }
            Event::CommandStatusChanged { command_id, status, duration_ms } => {
                task::command_status_changed(self, *command_id, *status, *duration_ms);
            }

            Event::ArtifactCreated { artifact_id, task_id, name, path, size } => {
                task::artifact_created(self, *artifact_id, *task_id, name, path, *size);
            }

            Event::BranchHistoryAppended { record } => task::branch_history_appended(self, record),
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
