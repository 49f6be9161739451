// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon-wide error type: configuration, lifecycle (lock/socket setup) and
//! request handling all fold into one enum so `main.rs` has a single `?`
//! surface to report and exit non-zero on.

use cfbot_core::PatchId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("config error: {0}")]
    Config(String),

    #[error("another cfbotd instance already holds the lock at {0}")]
    AlreadyRunning(String),

    #[error("no branch exists for id {0}")]
    BranchNotFound(String),

    #[error("no branch exists for patch {0}")]
    PatchNotFound(PatchId),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] cfbot_storage::StoreError),

    #[error(transparent)]
    Engine(#[from] cfbot_engine::EngineError),

    #[error(transparent)]
    Protocol(#[from] cfbot_wire::ProtocolError),
}
