// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task Ledger entities: Tasks (coarse stage steps), Commands (their
//! sub-steps) and Artifacts (saved output files).

use crate::ids::{ArtifactId, BranchId, CommandId, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Status shared by Tasks and Commands: `CREATED → EXECUTING → terminal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Created,
    Executing,
    Completed,
    Failed,
    Aborted,
    Errored,
}

crate::simple_display!(Status {
    Created => "CREATED",
    Executing => "EXECUTING",
    Completed => "COMPLETED",
    Failed => "FAILED",
    Aborted => "ABORTED",
    Errored => "ERRORED",
});

impl Status {
    /// `isDone` per §4.3: reached any terminal status.
    pub fn is_done(self) -> bool {
        matches!(self, Status::Completed | Status::Failed | Status::Aborted | Status::Errored)
    }

    /// `isFailure` per §4.3.
    pub fn is_failure(self) -> bool {
        matches!(self, Status::Failed | Status::Aborted | Status::Errored)
    }
}

/// The name of a coarse pipeline step, in the order the Applier/Compiler/Tester
/// stages create them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskName {
    Download,
    Apply,
    Compile,
    Ninja,
    Test,
    RunTest,
}

crate::simple_display!(TaskName {
    Download => "Download",
    Apply => "Apply",
    Compile => "Compile",
    Ninja => "Ninja",
    Test => "Test",
    RunTest => "Run Test",
});

/// Opaque per-task payload, e.g. `{"error": "..."}` written by the Engine when
/// a stage driver's background work is aborted.
pub type Payload = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub task_name: TaskName,
    pub branch_id: BranchId,
    pub position: u32,
    pub status: Status,
    pub payload: Payload,
    pub created_ms: u64,
    pub modified_ms: u64,
}

impl Task {
    pub fn new(id: TaskId, task_name: TaskName, branch_id: BranchId, position: u32, now_ms: u64) -> Self {
        Self {
            id,
            task_name,
            branch_id,
            position,
            status: Status::Created,
            payload: Payload::new(),
            created_ms: now_ms,
            modified_ms: now_ms,
        }
    }

    pub fn set_status(&mut self, status: Status, now_ms: u64) {
        self.status = status;
        self.modified_ms = now_ms;
    }

    pub fn is_done(&self) -> bool {
        self.status.is_done()
    }

    pub fn is_failure(&self) -> bool {
        self.status.is_failure()
    }
}

/// What kind of sub-step a Command represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandType {
    PatchsetFile,
    OtherFile,
    ApplyPatch,
    Configure,
    BuildTool,
    TestTool,
}

crate::simple_display!(CommandType {
    PatchsetFile => "Patchset File",
    OtherFile => "Other File",
    ApplyPatch => "Apply Patch",
    Configure => "Configure",
    BuildTool => "Build Tool",
    TestTool => "Test Tool",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub id: CommandId,
    pub task_id: TaskId,
    pub name: String,
    pub kind: CommandType,
    pub status: Status,
    pub duration_ms: Option<u64>,
    pub payload: Payload,
}

impl Command {
    pub fn new(id: CommandId, task_id: TaskId, name: impl Into<String>, kind: CommandType) -> Self {
        Self {
            id,
            task_id,
            name: name.into(),
            kind,
            status: Status::Created,
            duration_ms: None,
            payload: Payload::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: ArtifactId,
    pub task_id: TaskId,
    pub name: String,
    pub path: String,
    pub size: u64,
    pub body: Option<Vec<u8>>,
    pub payload: Payload,
}

impl Artifact {
    pub fn new(id: ArtifactId, task_id: TaskId, name: impl Into<String>, path: impl Into<String>, size: u64) -> Self {
        Self {
            id,
            task_id,
            name: name.into(),
            path: path.into(),
            size,
            body: None,
            payload: Payload::new(),
        }
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
