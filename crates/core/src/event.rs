// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The event vocabulary applied against [`crate::queue::QueueRing`], Branches
//! and the Task Ledger.
//!
//! Every variant here carries only inputs a caller chose (identifiers,
//! timestamps, externally-observed outcomes) and never a value *derived* from
//! prior state. That is what lets a WAL replay reconstruct identical state:
//! the algorithms these events drive (chiefly `QueueRing::insert`'s fair-
//! position walk) are pure functions of current state plus these same
//! arguments, so replaying them against freshly-replayed state recomputes the
//! same outcome every time.

use crate::branch::{BranchStatus, DiffStat};
use crate::ids::{ArtifactId, BranchId, CommandId, PatchId, QueueItemId, TaskId};
use crate::task::{CommandType, Payload, Status, TaskName};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Event {
    QueueItemInserted {
        item_id: QueueItemId,
        patch_id: PatchId,
        message_id: String,
        at_ms: u64,
    },
    QueueItemRemoved {
        item_id: QueueItemId,
    },
    /// Corresponds to one `getAndAdvance` call. `at_ms` is the only input the
    /// walk needs; the returned/new-cursor pair is recomputed on replay, not
    /// stored.
    QueueAdvanced {
        at_ms: u64,
    },
    QueueItemIgnored {
        item_id: QueueItemId,
        at_ms: u64,
    },
    QueueItemBaseCommitSet {
        item_id: QueueItemId,
        base_commit: String,
    },

    BranchCreated {
        patch_id: PatchId,
        branch_id: BranchId,
        branch_name: String,
        at_ms: u64,
    },
    BranchStatusChanged {
        patch_id: PatchId,
        status: BranchStatus,
        at_ms: u64,
    },
    /// Recorded once, on a successful Applier `didFail` sweep: the computed
    /// patch count, diff stats, and the commit ids from the merge step.
    BranchApplyResultRecorded {
        patch_id: PatchId,
        patch_count: u32,
        first_patch_stat: DiffStat,
        all_patches_stat: DiffStat,
        commit_id: String,
        base_commit: String,
    },
    BranchNeedsRebaseSet {
        patch_id: PatchId,
        at_ms: u64,
    },
    BranchNeedsRebaseCleared {
        patch_id: PatchId,
    },
    BranchFailingSet {
        patch_id: PatchId,
        at_ms: u64,
    },
    BranchFailingCleared {
        patch_id: PatchId,
    },

    TasksCleared {
        branch_id: BranchId,
    },
    TaskCreated {
        task_id: TaskId,
        branch_id: BranchId,
        task_name: TaskName,
        position: u32,
        at_ms: u64,
    },
    TaskStatusChanged {
        task_id: TaskId,
        status: Status,
        at_ms: u64,
    },
    TaskPayloadSet {
        task_id: TaskId,
        payload: Payload,
    },

    CommandCreated {
        command_id: CommandId,
        task_id: TaskId,
        name: String,
        kind: CommandType,
    },
    CommandStatusChanged {
        command_id: CommandId,
        status: Status,
        duration_ms: Option<u64>,
    },

    ArtifactCreated {
        artifact_id: ArtifactId,
        task_id: TaskId,
        name: String,
        path: String,
        size: u64,
    },

    /// The sole source of BranchHistory rows: one per Engine transition and
    /// per Notifier invocation.
    BranchHistoryAppended {
        record: BranchHistoryRecord,
    },
}

/// A snapshot of a Branch plus its Tasks at one transition, append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchHistoryRecord {
    pub id: crate::ids::BranchHistoryId,
    pub patch_id: PatchId,
    pub status: BranchStatus,
    pub task_count: u32,
    pub tasks: Vec<TaskHistoryEntry>,
    pub recorded_ms: u64,
}

/// One row of the inline task-tuple side table carried by a history record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskHistoryEntry {
    pub task_id: TaskId,
    pub task_name: TaskName,
    pub status: Status,
    pub created_ms: u64,
    pub modified_ms: u64,
    pub payload: Payload,
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
