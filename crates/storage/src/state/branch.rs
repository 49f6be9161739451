// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Folds `Branch*` events into `MaterializedState::branches`, keyed by
//! `PatchId` — a Branch is rewritten wholesale on each retry attempt, so
//! `BranchCreated` always overwrites rather than merging.

use super::MaterializedState;
use cfbot_core::{Branch, BranchId, BranchStatus, DiffStat, PatchId};

pub(super) fn created(state: &mut MaterializedState, patch_id: PatchId, branch_id: BranchId, branch_name: &str, at_ms: u64) {
    state.branches.insert(patch_id, Branch::new(patch_id, branch_id, branch_name, at_ms));
}

pub(super) fn status_changed(state: &mut MaterializedState, patch_id: PatchId, status: BranchStatus, at_ms: u64) {
    if let Some(branch) = state.branches.get_mut(&patch_id) {
        branch.status = status;
        branch.touch(at_ms);
    }
}

#[allow(clippy::too_many_arguments)]
pub(super) fn apply_result_recorded(
    state: &mut MaterializedState,
    patch_id: PatchId,
    patch_count: u32,
    first_patch_stat: DiffStat,
    all_patches_stat: DiffStat,
    commit_id: &str,
    base_commit: &str,
) {
    if let Some(branch) = state.branches.get_mut(&patch_id) {
        branch.patch_count = Some(patch_count);
        branch.first_patch_stat = first_patch_stat;
        branch.all_patches_stat = all_patches_stat;
        branch.commit_id = Some(commit_id.to_string());
        branch.base_commit = Some(base_commit.to_string());
    }
}

pub(super) fn needs_rebase_set(state: &mut MaterializedState, patch_id: PatchId, at_ms: u64) {
    if let Some(branch) = state.branches.get_mut(&patch_id) {
        branch.needs_rebase_since = Some(at_ms);
    }
}

pub(super) fn needs_rebase_cleared(state: &mut MaterializedState, patch_id: PatchId) {
    if let Some(branch) = state.branches.get_mut(&patch_id) {
        branch.needs_rebase_since = None;
    }
}

pub(super) fn failing_set(state: &mut MaterializedState, patch_id: PatchId, at_ms: u64) {
    if let Some(branch) = state.branches.get_mut(&patch_id) {
        branch.failing_since = Some(at_ms);
    }
}

pub(super) fn failing_cleared(state: &mut MaterializedState, patch_id: PatchId) {
    if let Some(branch) = state.branches.get_mut(&patch_id) {
        branch.failing_since = None;
    }
}
