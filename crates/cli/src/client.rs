// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A thin client over `cfbotd`'s Unix-socket wire protocol: connect, send
//! one [`Request`], read back one [`Response`].

use cfbot_wire::{decode, encode, read_message, write_message, ProtocolError, Request, Response};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::net::UnixStream;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not connect to cfbotd at {0}: {1}")]
    Connect(PathBuf, std::io::Error),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("cfbotd reported an error: {0}")]
    Daemon(String),

    #[error("unexpected response from cfbotd: {0}")]
    UnexpectedResponse(String),
}

pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self { socket_path: socket_path.into() }
    }

    async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let mut stream =
            UnixStream::connect(&self.socket_path).await.map_err(|e| ClientError::Connect(self.socket_path.clone(), e))?;
        write_message(&mut stream, &encode(request)?).await?;
        let bytes = read_message(&mut stream).await?;
        let response: Response = decode(&bytes)?;
        if let Response::Error { message } = response {
            return Err(ClientError::Daemon(message));
        }
        Ok(response)
    }

    /// Unwraps a successful [`Response`] with the closure, or rejects with
    /// [`ClientError::UnexpectedResponse`] if the daemon replied with the
    /// wrong variant for this request.
    async fn send_and_match<T>(&self, request: &Request, unwrap: impl FnOnce(Response) -> Option<T>) -> Result<T, ClientError> {
        let response = self.send(request).await?;
        let description = format!("{response:?}");
        unwrap(response).ok_or(ClientError::UnexpectedResponse(description))
    }

    pub async fn ping(&self) -> Result<(), ClientError> {
        self.send_and_match(&Request::Ping, |r| matches!(r, Response::Pong).then_some(())).await
    }

    pub async fn enqueue_patch(&self, patch_id: i64, message_id: String) -> Result<(), ClientError> {
        let request = Request::EnqueuePatch { patch_id, message_id };
        self.send_and_match(&request, |r| matches!(r, Response::Ok).then_some(())).await
    }

    pub async fn get_and_move(
        &self,
    ) -> Result<(Option<cfbot_wire::QueueItemDto>, Option<cfbot_wire::QueueItemDto>), ClientError> {
        self.send_and_match(&Request::GetAndMove, |r| match r {
            Response::MoveResult { returned, new_current } => Some((returned, new_current)),
            _ => None,
        })
        .await
    }

    pub async fn process_branch(&self, branch_id: String) -> Result<(cfbot_wire::BranchDto, Option<u64>), ClientError> {
        let request = Request::ProcessBranch { branch_id };
        self.send_and_match(&request, |r| match r {
            Response::Stepped { branch, delay_ms } => Some((branch, delay_ms)),
            _ => None,
        })
        .await
    }

    pub async fn peek(&self) -> Result<Option<cfbot_wire::QueueItemDto>, ClientError> {
        let request = Request::Query { query: cfbot_wire::Query::Peek };
        self.send_and_match(&request, |r| match r {
            Response::QueueItem { item } => Some(item),
            _ => None,
        })
        .await
    }

    pub async fn get_queue(&self) -> Result<Vec<cfbot_wire::QueueItemDto>, ClientError> {
        let request = Request::Query { query: cfbot_wire::Query::GetQueue };
        self.send_and_match(&request, |r| match r {
            Response::Queue { items } => Some(items),
            _ => None,
        })
        .await
    }

    pub async fn branches(&self) -> Result<Vec<cfbot_wire::BranchDto>, ClientError> {
        let request = Request::Query { query: cfbot_wire::Query::Branches };
        self.send_and_match(&request, |r| match r {
            Response::Branches { branches } => Some(branches),
            _ => None,
        })
        .await
    }

    pub async fn tasks(&self, branch_id: String) -> Result<Vec<cfbot_wire::TaskDto>, ClientError> {
        let request = Request::Query { query: cfbot_wire::Query::Tasks { branch_id } };
        self.send_and_match(&request, |r| match r {
            Response::Tasks { tasks } => Some(tasks),
            _ => None,
        })
        .await
    }

    pub async fn branch_history(&self, branch_id: String) -> Result<Vec<cfbot_wire::BranchHistoryDto>, ClientError> {
        let request = Request::Query { query: cfbot_wire::Query::BranchHistory { branch_id } };
        self.send_and_match(&request, |r| match r {
            Response::History { entries } => Some(entries),
            _ => None,
        })
        .await
    }

    pub async fn shutdown(&self) -> Result<(), ClientError> {
        self.send_and_match(&Request::Shutdown, |r| matches!(r, Response::Ok).then_some(())).await
    }
}

/// Default socket path to connect to when `--socket` isn't given: the one
/// `cfbotd` binds per its own config loading.
pub fn default_socket_path() -> PathBuf {
    cfbot_daemon::Config::default().socket_path
}

pub fn socket_path_from(arg: Option<&Path>) -> PathBuf {
    arg.map(Path::to_path_buf).unwrap_or_else(default_socket_path)
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
