// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire DTOs mirroring the REST surface of spec.md §6: serializable
//! snapshots of `cfbot-core` domain types, decoupled from their in-memory
//! shape so the wire format doesn't have to change in lockstep with the
//! core's internals.

use cfbot_core::{Branch, BranchHistoryRecord, BranchStatus, Command, DiffStat, QueueItem, Task};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueueItemDto {
    pub id: String,
    pub patch_id: i64,
    pub message_id: String,
    pub prev: Option<String>,
    pub next: Option<String>,
    pub processed_at_ms: Option<u64>,
    pub ignored_at_ms: Option<u64>,
    pub last_base_commit: Option<String>,
}

impl From<&QueueItem> for QueueItemDto {
    fn from(item: &QueueItem) -> Self {
        Self {
            id: item.id.to_string(),
            patch_id: item.patch_id.0,
            message_id: item.message_id.clone(),
            prev: item.prev.map(|id| id.to_string()),
            next: item.next.map(|id| id.to_string()),
            processed_at_ms: item.processed_at_ms,
            ignored_at_ms: item.ignored_at_ms,
            last_base_commit: item.last_base_commit.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiffStatDto {
    pub additions: u64,
    pub deletions: u64,
}

impl From<DiffStat> for DiffStatDto {
    fn from(stat: DiffStat) -> Self {
        Self { additions: stat.additions, deletions: stat.deletions }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BranchDto {
    pub patch_id: i64,
    pub branch_id: String,
    pub branch_name: String,
    pub status: String,
    pub commit_id: Option<String>,
    pub apply_url: Option<String>,
    pub patch_count: Option<u32>,
    pub first_patch_stat: DiffStatDto,
    pub all_patches_stat: DiffStatDto,
    pub needs_rebase_since: Option<u64>,
    pub failing_since: Option<u64>,
    pub base_commit: Option<String>,
    pub created_ms: u64,
    pub modified_ms: u64,
}

impl From<&Branch> for BranchDto {
    fn from(branch: &Branch) -> Self {
        Self {
            patch_id: branch.patch_id.0,
            branch_id: branch.branch_id.to_string(),
            branch_name: branch.branch_name.clone(),
            status: branch.status.to_string(),
            commit_id: branch.commit_id.clone(),
            apply_url: branch.apply_url.clone(),
            patch_count: branch.patch_count,
            first_patch_stat: branch.first_patch_stat.into(),
            all_patches_stat: branch.all_patches_stat.into(),
            needs_rebase_since: branch.needs_rebase_since,
            failing_since: branch.failing_since,
            base_commit: branch.base_commit.clone(),
            created_ms: branch.created_ms,
            modified_ms: branch.modified_ms,
        }
    }
}

impl BranchDto {
    /// Parses `status` back into a [`BranchStatus`]; only ever fails for a
    /// hand-crafted/corrupt DTO, never for one produced by `From<&Branch>`.
    pub fn parse_status(&self) -> Option<BranchStatus> {
        use BranchStatus::*;
        [
            New,
            Applying,
            ApplyingFailed,
            ApplyingAborted,
            Applied,
            Compiling,
            CompilingFailed,
            CompilingAborted,
            Compiled,
            Testing,
            TestingFailed,
            TestingAborted,
            Tested,
            Notifying,
            Finished,
        ]
        .into_iter()
        .find(|s| s.to_string() == self.status)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskDto {
    pub id: String,
    pub task_name: String,
    pub branch_id: String,
    pub position: u32,
    pub status: String,
    pub created_ms: u64,
    pub modified_ms: u64,
}

impl From<&Task> for TaskDto {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.to_string(),
            task_name: task.task_name.to_string(),
            branch_id: task.branch_id.to_string(),
            position: task.position,
            status: task.status.to_string(),
            created_ms: task.created_ms,
            modified_ms: task.modified_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandDto {
    pub id: String,
    pub task_id: String,
    pub name: String,
    pub kind: String,
    pub status: String,
    pub duration_ms: Option<u64>,
}

impl From<&Command> for CommandDto {
    fn from(command: &Command) -> Self {
        Self {
            id: command.id.to_string(),
            task_id: command.task_id.to_string(),
            name: command.name.clone(),
            kind: command.kind.to_string(),
            status: command.status.to_string(),
            duration_ms: command.duration_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BranchHistoryDto {
    pub id: String,
    pub patch_id: i64,
    pub status: String,
    pub task_count: u32,
    pub recorded_ms: u64,
}

impl From<&BranchHistoryRecord> for BranchHistoryDto {
    fn from(record: &BranchHistoryRecord) -> Self {
        Self {
            id: record.id.to_string(),
            patch_id: record.patch_id.0,
            status: record.status.to_string(),
            task_count: record.task_count,
            recorded_ms: record.recorded_ms,
        }
    }
}

#[cfg(test)]
#[path = "dto_tests.rs"]
mod tests;
