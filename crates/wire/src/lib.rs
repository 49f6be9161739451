// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! DTOs and a length-prefixed JSON codec for `cfbotd`'s IPC surface.
//!
//! This stands in for the HTTP/REST API of spec.md §6, which is explicitly
//! out of scope as an external collaborator: the request/response shapes
//! are reproduced here so the core's behavior is exercisable and testable
//! without pulling in an HTTP framework, exactly as the teacher's own daemon
//! serves its CLI over a length-prefixed JSON Unix-socket protocol rather
//! than HTTP.

mod codec;
mod dto;
mod query;
mod request;
mod response;

pub use codec::{decode, encode, read_message, read_request, write_message, write_response, ProtocolError};
pub use dto::{BranchDto, BranchHistoryDto, CommandDto, DiffStatDto, QueueItemDto, TaskDto};
pub use query::Query;
pub use request::Request;
pub use response::Response;
