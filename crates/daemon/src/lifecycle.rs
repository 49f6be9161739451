// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup: acquire the lock file first (so a second `cfbotd`
//! against the same data directory fails fast), open the `Store` (which
//! handles its own snapshot+WAL replay), then bind the Unix socket last so
//! a partially-started daemon never appears reachable.

use crate::config::Config;
use fs2::FileExt;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;
use tokio::net::UnixListener;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("another cfbotd instance already holds the lock at {0}")]
    LockFailed(PathBuf),
    #[error("failed to bind unix socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Store(#[from] cfbot_storage::StoreError),
}

/// Holds the daemon's exclusive lock for the process lifetime; dropping it
/// releases the flock.
pub struct LockGuard {
    _file: File,
}

pub struct StartupResult {
    pub store: cfbot_storage::Store,
    pub listener: UnixListener,
    pub lock: LockGuard,
}

pub async fn startup(config: &Config) -> Result<StartupResult, LifecycleError> {
    match startup_inner(config).await {
        Ok(result) => Ok(result),
        Err(e) => {
            if !matches!(e, LifecycleError::LockFailed(_)) {
                cleanup_on_failure(config);
            }
            Err(e)
        }
    }
}

async fn startup_inner(config: &Config) -> Result<StartupResult, LifecycleError> {
    std::fs::create_dir_all(&config.data_dir)?;
    if let Some(parent) = config.socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::create_dir_all(&config.base_dir)?;

    let lock_path = config.lock_path();
    let lock_file = std::fs::OpenOptions::new().write(true).create(true).truncate(false).open(&lock_path)?;
    lock_file.try_lock_exclusive().map_err(|_| LifecycleError::LockFailed(lock_path.clone()))?;

    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;

    let store = cfbot_storage::Store::open(&config.data_dir)?;

    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener =
        UnixListener::bind(&config.socket_path).map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;

    Ok(StartupResult { store, listener, lock: LockGuard { _file: lock_file } })
}

fn cleanup_on_failure(config: &Config) {
    if config.socket_path.exists() {
        let _ = std::fs::remove_file(&config.socket_path);
    }
    let lock_path = config.lock_path();
    if lock_path.exists() {
        let _ = std::fs::remove_file(&lock_path);
    }
}
