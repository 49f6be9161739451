// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identifier types for queue items, branches, tasks, commands and artifacts.

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Identifier for a queue item. Generated at insertion time.
    pub struct QueueItemId("qi-");
}

crate::define_id! {
    /// Identifier for one attempt (a branch) at running a patch set through the pipeline.
    pub struct BranchId("brn-");
}

crate::define_id! {
    /// Identifier for a BranchHistory row.
    pub struct BranchHistoryId("bh-");
}

crate::define_id! {
    /// Identifier for a coarse pipeline step (Download, Apply, Compile, Ninja, Test, Run Test).
    pub struct TaskId("tsk-");
}

crate::define_id! {
    /// Identifier for a sub-step of a Task (one file download, one patch apply).
    pub struct CommandId("cmd-");
}

crate::define_id! {
    /// Identifier for a saved output file.
    pub struct ArtifactId("art-");
}

/// Identity of a patch set, assigned by the mail-archive ingestion collaborator.
///
/// Unlike the other identifiers here this is not generated by the core: it is
/// handed in by the caller (the commitfest patch record) and is globally unique
/// across queue items and branches (it is also the Branch primary key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatchId(pub i64);

impl PatchId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for PatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for PatchId {
    fn from(v: i64) -> Self {
        Self(v)
    }
}

#[cfg(test)]
#[path = "ids_tests.rs"]
mod tests;
