// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use cfbot_core::{BranchStatus, PatchId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no branch exists for patch {0}")]
    BranchNotFound(PatchId),

    /// A true programmer error: the Branch carries a status the state
    /// machine in §4.2 does not define a handler for. Fatal, not retried.
    #[error("branch for patch {patch_id} is in an unhandled status: {status:?}")]
    InvalidState { patch_id: PatchId, status: BranchStatus },

    #[error(transparent)]
    Ledger(#[from] cfbot_core::ledger::LedgerError),

    #[error(transparent)]
    Store(#[from] cfbot_storage::StoreError),
}
