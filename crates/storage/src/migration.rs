// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schema migrations for persisted snapshots. A snapshot carries its schema
//! version inline (`{"v": N, ...}`); [`MigrationRegistry::migrate_to`] walks
//! a chain of single-version-step [`Migration`]s to bring an old snapshot up
//! to the version the running binary understands.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MigrationError {
    #[error("snapshot schema version {0} is newer than this binary supports ({1})")]
    TooNew(u32, u32),
    #[error("no migration path from version {0} to {1}")]
    NoPath(u32, u32),
    #[error("snapshot is missing a valid 'v' schema version field")]
    MalformedVersion,
}

/// A single schema-version step. Mutates `snapshot` in place; the registry
/// is responsible for updating the `v` field between steps.
pub trait Migration: Send + Sync {
    fn source_version(&self) -> u32;
    fn target_version(&self) -> u32;
    fn migrate(&self, snapshot: &mut Value) -> Result<(), MigrationError>;
}

/// An ordered collection of [`Migration`]s, chained by version at
/// [`MigrationRegistry::migrate_to`] time.
#[derive(Default)]
pub struct MigrationRegistry {
    pub migrations: Vec<Box<dyn Migration>>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply migrations in sequence until `snapshot`'s `v` field equals
    /// `target`. A no-op if it's already there.
    pub fn migrate_to(&self, mut snapshot: Value, target: u32) -> Result<Value, MigrationError> {
        let mut current = read_version(&snapshot)?;

        if current == target {
            return Ok(snapshot);
        }
        if current > target {
            return Err(MigrationError::TooNew(current, target));
        }

        while current != target {
            let step = self
                .migrations
                .iter()
                .find(|m| m.source_version() == current)
                .ok_or(MigrationError::NoPath(current, target))?;
            step.migrate(&mut snapshot)?;
            current = step.target_version();
            if let Some(obj) = snapshot.as_object_mut() {
                obj.insert("v".to_string(), Value::from(current));
            }
        }

        Ok(snapshot)
    }
}

fn read_version(snapshot: &Value) -> Result<u32, MigrationError> {
    snapshot.get("v").and_then(Value::as_u64).map(|v| v as u32).ok_or(MigrationError::MalformedVersion)
}

#[cfg(test)]
#[path = "migration_tests.rs"]
mod tests;
