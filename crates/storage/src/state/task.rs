// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Folds Task Ledger events (`Task*`/`Command*`/`Artifact*`/
//! `BranchHistoryAppended`) into `MaterializedState`.

use super::MaterializedState;
use cfbot_core::{
    Artifact, ArtifactId, BranchHistoryRecord, BranchId, Command, CommandId, CommandType, Payload, Status, Task,
    TaskId, TaskName,
};

pub(super) fn tasks_cleared(state: &mut MaterializedState, branch_id: BranchId) {
    let dead_tasks: Vec<TaskId> = state.tasks.values().filter(|t| t.branch_id == branch_id).map(|t| t.id).collect();
    let dead_commands: Vec<CommandId> =
        state.commands.values().filter(|c| dead_tasks.contains(&c.task_id)).map(|c| c.id).collect();
    let dead_artifacts: Vec<ArtifactId> =
        state.artifacts.values().filter(|a| dead_tasks.contains(&a.task_id)).map(|a| a.id).collect();

    for id in dead_tasks {
        state.tasks.remove(&id);
    }
    for id in dead_commands {
        state.commands.remove(&id);
    }
    for id in dead_artifacts {
        state.artifacts.remove(&id);
    }
}

pub(super) fn task_created(
    state: &mut MaterializedState,
    task_id: TaskId,
    branch_id: BranchId,
    task_name: TaskName,
    position: u32,
    at_ms: u64,
) {
    state.tasks.insert(task_id, Task::new(task_id, task_name, branch_id, position, at_ms));
}

pub(super) fn task_status_changed(state: &mut MaterializedState, task_id: TaskId, status: Status, at_ms: u64) {
    if let Some(task) = state.tasks.get_mut(&task_id) {
        task.set_status(status, at_ms);
    }
}

pub(super) fn task_payload_set(state: &mut MaterializedState, task_id: TaskId, payload: Payload) {
    if let Some(task) = state.tasks.get_mut(&task_id) {
        task.payload = payload;
    }
}

pub(super) fn command_created(state: &mut MaterializedState, command_id: CommandId, task_id: TaskId, name: &str, kind: CommandType) {
    state.commands.insert(command_id, Command::new(command_id, task_id, name, kind));
}

pub(super) fn command_status_changed(
    state: &mut MaterializedState,
    command_id: CommandId,
    status: Status,
    duration_ms: Option<u64>,
) {
    if let Some(command) = state.commands.get_mut(&command_id) {
        command.status = status;
        command.duration_ms = duration_ms;
    }
}

pub(super) fn artifact_created(
    state: &mut MaterializedState,
    artifact_id: ArtifactId,
    task_id: TaskId,
    name: &str,
    path: &str,
    size: u64,
) {
    state.artifacts.insert(artifact_id, Artifact::new(artifact_id, task_id, name, path, size));
}

pub(super) fn branch_history_appended(state: &mut MaterializedState, record: &BranchHistoryRecord) {
    if !state.branch_history.iter().any(|r| r.id == record.id) {
        state.branch_history.push(record.clone());
    }
}
