// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ties [`Wal`], [`MaterializedState`] and snapshotting together into the one
//! thing callers actually open: append an event, it's durable and folded
//! into state; periodically checkpoint so recovery doesn't replay from
//! scratch.

use crate::migration::MigrationRegistry;
use crate::snapshot::{self, SnapshotError};
use crate::state::MaterializedState;
use crate::wal::{Wal, WalError};
use cfbot_core::Event;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Checkpoint once this many events have been applied since the last one.
const DEFAULT_SNAPSHOT_EVERY: u64 = 500;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Wal(#[from] WalError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

pub struct Store {
    state: MaterializedState,
    wal: Wal,
    snapshot_path: PathBuf,
    migrations: MigrationRegistry,
    applied_since_snapshot: u64,
    snapshot_every: u64,
}

impl Store {
    /// Open (or create) a store rooted at `dir`: `dir/wal.jsonl` and
    /// `dir/snapshot.zst`. Replays any WAL entries written after the last
    /// snapshot's sequence number.
    pub fn open(dir: impl AsRef<Path>) -> Result<Store, StoreError> {
        Self::open_with(dir, MigrationRegistry::new(), DEFAULT_SNAPSHOT_EVERY)
    }

    pub fn open_with(dir: impl AsRef<Path>, migrations: MigrationRegistry, snapshot_every: u64) -> Result<Store, StoreError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let snapshot_path = dir.join("snapshot.zst");
        let wal_path = dir.join("wal.jsonl");

        let (snapshot_seq, mut state) = match snapshot::load(&snapshot_path, &migrations)? {
            Some((seq, state)) => (seq, state),
            None => (0, MaterializedState::new()),
        };

        let mut wal = Wal::open(&wal_path, snapshot_seq)?;
        let mut applied = 0u64;
        for entry in wal.entries_after(snapshot_seq)? {
            state.apply_event(&entry.event);
            wal.mark_processed(entry.seq);
            applied += 1;
        }

        Ok(Store { state, wal, snapshot_path, migrations, applied_since_snapshot: applied, snapshot_every })
    }

    pub fn state(&self) -> &MaterializedState {
        &self.state
    }

    /// Append `event` to the WAL, fold it into state, and flush. Checkpoints
    /// automatically once `snapshot_every` events have accumulated.
    pub fn apply(&mut self, event: Event) -> Result<(), StoreError> {
        let seq = self.wal.append(&event)?;
        self.state.apply_event(&event);
        self.wal.mark_processed(seq);
        self.applied_since_snapshot += 1;

        if self.wal.needs_flush() {
            self.wal.flush()?;
        }
        if self.applied_since_snapshot >= self.snapshot_every {
            self.checkpoint()?;
        }
        Ok(())
    }

    /// Force a snapshot of current state and truncate the WAL prefix it
    /// covers.
    pub fn checkpoint(&mut self) -> Result<(), StoreError> {
        self.wal.flush()?;
        let seq = self.wal.processed_seq();
        snapshot::save(&self.snapshot_path, seq, &self.state)?;
        self.wal.truncate_before(seq + 1)?;
        self.applied_since_snapshot = 0;
        Ok(())
    }

    pub fn migrations(&self) -> &MigrationRegistry {
        &self.migrations
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
