// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Folds `Queue*` events into `MaterializedState::queue`. Thin wrappers
//! around `QueueRing`'s own methods — the ring is already idempotent and
//! replay-safe, so there's no extra bookkeeping needed here.

use super::MaterializedState;
use cfbot_core::{PatchId, QueueItemId};

pub(super) fn item_inserted(state: &mut MaterializedState, item_id: QueueItemId, patch_id: PatchId, message_id: &str, at_ms: u64) {
    state.queue.insert(item_id, patch_id, message_id, at_ms);
}

pub(super) fn item_removed(state: &mut MaterializedState, item_id: QueueItemId) {
    let _ = state.queue.remove(item_id);
}

pub(super) fn advanced(state: &mut MaterializedState, at_ms: u64) {
    let _ = state.queue.get_and_advance(at_ms);
}

pub(super) fn item_ignored(state: &mut MaterializedState, item_id: QueueItemId, at_ms: u64) {
    state.queue.set_ignored(item_id, at_ms);
}

pub(super) fn item_base_commit_set(state: &mut MaterializedState, item_id: QueueItemId, base_commit: &str) {
    state.queue.set_last_base_commit(item_id, base_commit);
}
