// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Responses `cfbotd` sends back for each [`crate::Request`] variant.

use crate::dto::{BranchDto, BranchHistoryDto, QueueItemDto, TaskDto};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    Ok,
    Pong,

    /// Reply to `Request::GetAndMove`: `{returned, newcurrent}` per §6.
    MoveResult { returned: Option<QueueItemDto>, new_current: Option<QueueItemDto> },

    /// Reply to `Query::Peek`.
    QueueItem { item: Option<QueueItemDto> },

    /// Reply to `Query::GetQueue`.
    Queue { items: Vec<QueueItemDto> },

    /// Reply to `Query::Branches`.
    Branches { branches: Vec<BranchDto> },

    /// Reply to `Query::Tasks`.
    Tasks { tasks: Vec<TaskDto> },

    /// Reply to `Request::ProcessBranch`.
    Stepped { branch: BranchDto, delay_ms: Option<u64> },

    /// Reply to `Query::BranchHistory`, reverse-chronological.
    History { entries: Vec<BranchHistoryDto> },

    Error { message: String },
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
