// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only queries mirroring the `GET` routes of spec.md §6.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Query {
    /// `GET /api/v1/cfbot/peek`
    Peek,
    /// `GET /api/v1/cfbot/get_queue`
    GetQueue,
    /// `GET /api/v1/cfbot/branches`
    Branches,
    /// `GET /api/v1/cfbot/tasks?branch_id=...`
    Tasks { branch_id: String },
    /// `GET /api/v1/cfbot/branch_history?branch_id=...`
    BranchHistory { branch_id: String },
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
