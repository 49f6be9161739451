// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Requests a CLI client sends to `cfbotd`, mirroring the mutating routes
//! and ticks of spec.md §6 plus a health-check handshake (the teacher's
//! daemon/cli split always opens with a `Ping`/`Hello`).

use crate::Query;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check.
    Ping,

    /// Run a read-only [`Query`].
    Query { query: Query },

    /// `POST /api/v1/cfbot/enqueue_patch` — body `{patch_id}`.
    EnqueuePatch { patch_id: i64, message_id: String },

    /// `GET /api/v1/cfbot/get_and_move` — `Queue.getAndAdvance`.
    GetAndMove,

    /// `GET /api/v1/cfbot/branches/<id>/process_branch` — one `Engine.step`.
    ProcessBranch { branch_id: String },

    /// Ask the daemon to stop its ticker loop and close the listener.
    Shutdown,
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
