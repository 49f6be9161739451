// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unix-socket listener: accept a connection, read one [`Request`], dispatch
//! it against the shared [`App`], write one [`Response`], close. No TCP, no
//! auth handshake — the IPC surface this stands in for (§6) is reachable
//! only from the local machine, same as the teacher's Unix-only mode.

use crate::app::App;
use cfbot_core::{BranchId, PatchId};
use cfbot_wire::{read_request, write_response, ProtocolError, Query, Request, Response};
use std::sync::Arc;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{Mutex, Notify};
use tracing::{debug, error, info, warn};

pub struct Listener {
    unix: UnixListener,
    app: Arc<Mutex<App>>,
    shutdown: Arc<Notify>,
}

impl Listener {
    pub fn new(unix: UnixListener, app: Arc<Mutex<App>>, shutdown: Arc<Notify>) -> Self {
        Self { unix, app, shutdown }
    }

    /// Accept connections forever, spawning one task per connection.
    pub async fn run(self) {
        loop {
            match self.unix.accept().await {
                Ok((stream, _addr)) => {
                    let app = Arc::clone(&self.app);
                    let shutdown = Arc::clone(&self.shutdown);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, app, shutdown).await {
                            log_connection_error(e);
                        }
                    });
                }
                Err(e) => error!(error = %e, "unix accept error"),
            }
        }
    }
}

fn log_connection_error(e: ProtocolError) {
    match e {
        ProtocolError::Io(ref io) if io.kind() == std::io::ErrorKind::UnexpectedEof => debug!("client disconnected"),
        other => warn!(error = %other, "connection error"),
    }
}

async fn handle_connection(mut stream: UnixStream, app: Arc<Mutex<App>>, shutdown: Arc<Notify>) -> Result<(), ProtocolError> {
    let request = read_request(&mut stream).await?;

    if matches!(request, Request::Query { .. }) {
        debug!(request = ?request, "received query");
    } else {
        info!(request = ?request, "received request");
    }

    let response = dispatch(request, &app, &shutdown).await;
    write_response(&mut stream, &response).await
}

async fn dispatch(request: Request, app: &Arc<Mutex<App>>, shutdown: &Arc<Notify>) -> Response {
    match request {
        Request::Ping => Response::Pong,

        Request::EnqueuePatch { patch_id, message_id } => {
            let mut app = app.lock().await;
            match app.enqueue_patch(PatchId::new(patch_id), message_id) {
                Ok(()) => Response::Ok,
                Err(e) => error_response(e),
            }
        }

        Request::GetAndMove => {
            let mut app = app.lock().await;
            match app.get_and_move() {
                Ok((returned, new_current)) => Response::MoveResult { returned, new_current },
                Err(e) => error_response(e),
            }
        }

        Request::ProcessBranch { branch_id } => {
            let mut app = app.lock().await;
            match app.process_branch(BranchId::from_string(&branch_id)).await {
                Ok(response) => response,
                Err(e) => error_response(e),
            }
        }

        Request::Query { query } => {
            let app = app.lock().await;
            match query {
                Query::Peek => Response::QueueItem { item: app.peek() },
                Query::GetQueue => Response::Queue { items: app.get_queue() },
                Query::Branches => Response::Branches { branches: app.branches() },
                Query::Tasks { branch_id } => Response::Tasks { tasks: app.tasks(BranchId::from_string(&branch_id)) },
                Query::BranchHistory { branch_id } => {
                    Response::History { entries: app.branch_history(BranchId::from_string(&branch_id)) }
                }
            }
        }

        Request::Shutdown => {
            shutdown.notify_one();
            Response::Ok
        }
    }
}

fn error_response(e: impl std::fmt::Display) -> Response {
    Response::Error { message: e.to_string() }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
