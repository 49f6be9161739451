// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! zstd-compressed, versioned snapshots of [`MaterializedState`], so a
//! restart doesn't have to replay the whole WAL from the beginning.

use crate::migration::MigrationRegistry;
use crate::state::MaterializedState;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Schema version this binary writes and, after migration, understands.
pub const CURRENT_SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialize error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("compression error: {0}")]
    Compression(std::io::Error),
    #[error("migration error: {0}")]
    Migration(#[from] crate::migration::MigrationError),
}

#[derive(Serialize, Deserialize)]
struct SnapshotEnvelope {
    v: u32,
    seq: u64,
    state: MaterializedState,
}

/// Write `state` as of WAL sequence `seq`, zstd-compressed, to `path`.
pub fn save(path: impl AsRef<Path>, seq: u64, state: &MaterializedState) -> Result<(), SnapshotError> {
    let envelope = SnapshotEnvelope { v: CURRENT_SNAPSHOT_VERSION, seq, state: state.clone() };
    let json = serde_json::to_vec(&envelope)?;
    let compressed = zstd::stream::encode_all(json.as_slice(), 0).map_err(SnapshotError::Compression)?;
    let tmp = path.as_ref().with_extension("tmp");
    fs::write(&tmp, compressed)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Load and decompress a snapshot, migrating it to `CURRENT_SNAPSHOT_VERSION`
/// if it was written by an older binary. `Ok(None)` if no snapshot exists yet.
pub fn load(path: impl AsRef<Path>, registry: &MigrationRegistry) -> Result<Option<(u64, MaterializedState)>, SnapshotError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(None);
    }

    let compressed = fs::read(path)?;
    let json = zstd::stream::decode_all(compressed.as_slice()).map_err(SnapshotError::Compression)?;
    let raw: serde_json::Value = serde_json::from_slice(&json)?;
    let migrated = registry.migrate_to(raw, CURRENT_SNAPSHOT_VERSION)?;
    let envelope: SnapshotEnvelope = serde_json::from_value(migrated)?;
    Ok(Some((envelope.seq, envelope.state)))
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
