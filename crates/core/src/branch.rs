// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A Branch is one attempted run of the pipeline against one patch set.

use crate::ids::{BranchId, PatchId};
use serde::{Deserialize, Serialize};

/// Where a Branch sits in the apply → compile → test → notify lifecycle.
///
/// Terminal states are [`BranchStatus::Finished`] and the six
/// `*-failed`/`*-aborted` variants; see `is_terminal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BranchStatus {
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
}

crate::simple_display!(BranchStatus {
    New => "new",
    Applying => "applying",
    ApplyingFailed => "applying-failed",
    ApplyingAborted => "applying-aborted",
    Applied => "applied",
    Compiling => "compiling",
    CompilingFailed => "compiling-failed",
    CompilingAborted => "compiling-aborted",
    Compiled => "compiled",
    Testing => "testing",
    TestingFailed => "testing-failed",
    TestingAborted => "testing-aborted",
    Tested => "tested",
    Notifying => "notifying",
    Finished => "finished",
});

impl BranchStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BranchStatus::Finished
                | BranchStatus::ApplyingFailed
                | BranchStatus::ApplyingAborted
                | BranchStatus::CompilingFailed
                | BranchStatus::CompilingAborted
                | BranchStatus::TestingFailed
                | BranchStatus::TestingAborted
        )
    }

    pub fn is_failure(self) -> bool {
        matches!(
            self,
            BranchStatus::ApplyingFailed
                | BranchStatus::ApplyingAborted
                | BranchStatus::CompilingFailed
                | BranchStatus::CompilingAborted
                | BranchStatus::TestingFailed
                | BranchStatus::TestingAborted
        )
    }
}

/// Per-extension-group diff stats captured by the Applier on success.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStat {
    pub additions: u64,
    pub deletions: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub patch_id: PatchId,
    pub branch_id: BranchId,
    pub branch_name: String,
    pub status: BranchStatus,
    pub commit_id: Option<String>,
    pub apply_url: Option<String>,
    pub patch_count: Option<u32>,
    pub first_patch_stat: DiffStat,
    pub all_patches_stat: DiffStat,
    pub needs_rebase_since: Option<u64>,
    pub failing_since: Option<u64>,
    pub base_commit: Option<String>,
    pub created_ms: u64,
    pub modified_ms: u64,
}

impl Branch {
    /// A fresh attempt, as created when a QueueItem is dequeued.
    pub fn new(patch_id: PatchId, branch_id: BranchId, branch_name: impl Into<String>, now_ms: u64) -> Self {
        Self {
            patch_id,
            branch_id,
            branch_name: branch_name.into(),
            status: BranchStatus::New,
            commit_id: None,
            apply_url: None,
            patch_count: None,
            first_patch_stat: DiffStat::default(),
            all_patches_stat: DiffStat::default(),
            needs_rebase_since: None,
            failing_since: None,
            base_commit: None,
            created_ms: now_ms,
            modified_ms: now_ms,
        }
    }

    pub fn touch(&mut self, now_ms: u64) {
        self.modified_ms = now_ms;
    }
}

#[cfg(test)]
#[path = "branch_tests.rs"]
mod tests;
