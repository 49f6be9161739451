// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event-sourced persistence for the pipeline core: a write-ahead log, a
//! materialized state that folds events into `cfbot-core`'s data structures,
//! zstd-compressed snapshots, and schema migrations between snapshot
//! versions.

pub mod ledger_impl;
pub mod migration;
pub mod snapshot;
pub mod state;
pub mod store;
pub mod wal;

pub use ledger_impl::StoreLedger;
pub use migration::{Migration, MigrationError, MigrationRegistry};
pub use snapshot::{SnapshotError, CURRENT_SNAPSHOT_VERSION};
pub use state::MaterializedState;
pub use store::{Store, StoreError};
pub use wal::{Wal, WalEntry, WalError};
