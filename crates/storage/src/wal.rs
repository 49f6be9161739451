// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A write-ahead log of [`cfbot_core::Event`]s: one JSON object per line,
//! appended in order and assigned a monotonic sequence number.
//!
//! Corruption is expected at the tail (a process killed mid-write) and is
//! handled at [`Wal::open`] time: the valid prefix is kept, the rest is
//! rotated aside to `<path>.bak` (keeping up to three generations) rather
//! than discarded outright.

use cfbot_core::Event;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Flush once this many entries have been appended since the last flush.
const FLUSH_THRESHOLD: u64 = 100;
/// Or once this much time has passed, whichever comes first.
const FLUSH_INTERVAL: Duration = Duration::from_secs(5);
/// Number of rotated backups kept around a corrupt WAL file.
const MAX_BACKUPS: u32 = 3;

#[derive(Debug, Error)]
pub enum WalError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize WAL entry: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One logged, sequenced event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalEntry {
    pub seq: u64,
    pub event: Event,
}

/// An append-only, sequence-numbered log of events, backed by a single file.
pub struct Wal {
    path: PathBuf,
    file: File,
    write_seq: u64,
    processed_seq: u64,
    read_seq: u64,
    unflushed: u64,
    last_flush: Instant,
}

impl Wal {
    /// Open (creating if absent) the WAL at `path`. `processed_seq` is the
    /// durable high-water mark recovered from the last snapshot checkpoint;
    /// [`Wal::next_unprocessed`] starts delivering entries after it.
    ///
    /// If the file's tail is corrupt, the valid prefix is preserved in place
    /// and the original file is rotated to a numbered `.bak` before the
    /// truncated file is reopened.
    pub fn open(path: impl Into<PathBuf>, processed_seq: u64) -> Result<Wal, WalError> {
        let path = path.into();
        let bytes = if path.exists() { fs::read(&path)? } else { Vec::new() };
        let (entries, corrupt, valid_len) = scan(&bytes);

        if corrupt {
            rotate_backups(&path)?;
            fs::write(&path, &bytes[..valid_len])?;
        } else if !path.exists() {
            File::create(&path)?;
        }

        let write_seq = entries.last().map(|e| e.seq).unwrap_or(0);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Wal {
            path,
            file,
            write_seq,
            processed_seq,
            read_seq: processed_seq,
            unflushed: 0,
            last_flush: Instant::now(),
        })
    }

    pub fn write_seq(&self) -> u64 {
        self.write_seq
    }

    pub fn processed_seq(&self) -> u64 {
        self.processed_seq
    }

    /// Append `event`, returning its assigned sequence number. Written
    /// immediately (visible to subsequent reads of the file) but not
    /// fsynced; call [`Wal::flush`] for durability.
    pub fn append(&mut self, event: &Event) -> Result<u64, WalError> {
        let seq = self.write_seq + 1;
        let entry = WalEntry { seq, event: event.clone() };
        let line = serde_json::to_string(&entry)?;
        writeln!(self.file, "{line}")?;
        self.write_seq = seq;
        self.unflushed += 1;
        Ok(seq)
    }

    /// Fsync the underlying file and reset the flush clock.
    pub fn flush(&mut self) -> Result<(), WalError> {
        self.file.flush()?;
        self.file.sync_data()?;
        self.unflushed = 0;
        self.last_flush = Instant::now();
        Ok(())
    }

    /// Whether enough has accumulated (by count or by elapsed time) to
    /// warrant a [`Wal::flush`].
    pub fn needs_flush(&self) -> bool {
        self.unflushed >= FLUSH_THRESHOLD || (self.unflushed > 0 && self.last_flush.elapsed() >= FLUSH_INTERVAL)
    }

    /// The next entry after the read cursor (seeded from `processed_seq` at
    /// open time, advanced by each call). Re-reads the file from disk, so it
    /// observes entries appended since `open`. Stops, returning `None`
    /// without error, if the log is exhausted or corrupt from this point on.
    pub fn next_unprocessed(&mut self) -> Result<Option<WalEntry>, WalError> {
        let entries = self.read_entries()?;
        let next = entries.into_iter().find(|e| e.seq > self.read_seq);
        if let Some(ref entry) = next {
            self.read_seq = entry.seq;
        }
        Ok(next)
    }

    /// Record that everything up to and including `seq` has been durably
    /// applied to a materialized state (e.g. via a snapshot).
    pub fn mark_processed(&mut self, seq: u64) {
        if seq > self.processed_seq {
            self.processed_seq = seq;
        }
    }

    /// All valid entries with `seq > after`, stopping at the first
    /// unparseable line.
    pub fn entries_after(&self, after: u64) -> Result<Vec<WalEntry>, WalError> {
        Ok(self.read_entries()?.into_iter().filter(|e| e.seq > after).collect())
    }

    /// Rewrite the file keeping only entries with `seq >= keep_from`. Used
    /// after a snapshot checkpoint to bound WAL growth.
    pub fn truncate_before(&mut self, keep_from: u64) -> Result<(), WalError> {
        let kept: Vec<WalEntry> = self.read_entries()?.into_iter().filter(|e| e.seq >= keep_from).collect();
        let mut buf = Vec::new();
        for entry in &kept {
            buf.extend_from_slice(serde_json::to_string(entry)?.as_bytes());
            buf.push(b'\n');
        }
        fs::write(&self.path, &buf)?;
        self.file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        self.unflushed = 0;
        self.last_flush = Instant::now();
        Ok(())
    }

    fn read_entries(&self) -> Result<Vec<WalEntry>, WalError> {
        let bytes = fs::read(&self.path)?;
        let (entries, _corrupt, _valid_len) = scan(&bytes);
        Ok(entries)
    }
}

/// Parse `bytes` line by line as JSON [`WalEntry`] records, stopping at the
/// first line that isn't valid UTF-8 or valid JSON for the type. Returns the
/// valid entries, whether corruption was found, and the byte length of the
/// valid prefix (including its trailing newline).
fn scan(bytes: &[u8]) -> (Vec<WalEntry>, bool, usize) {
    let mut entries = Vec::new();
    let mut offset = 0usize;
    let mut corrupt = false;

    for line in bytes.split(|&b| b == b'\n') {
        if line.is_empty() {
            // Either a trailing blank line after the final newline, or two
            // consecutive newlines; neither signals corruption on its own.
            if offset < bytes.len() {
                offset += 1;
            }
            continue;
        }
        match std::str::from_utf8(line).ok().and_then(|s| serde_json::from_str::<WalEntry>(s).ok()) {
            Some(entry) => {
                entries.push(entry);
                offset += line.len() + 1;
            }
            None => {
                corrupt = true;
                break;
            }
        }
    }

    (entries, corrupt, offset.min(bytes.len()))
}

/// Shift `<path>.bak` -> `.bak.2` -> `.bak.3`, dropping anything older, then
/// copy the current file to `<path>.bak`.
fn rotate_backups(path: &Path) -> Result<(), WalError> {
    if !path.exists() {
        return Ok(());
    }

    for gen in (1..MAX_BACKUPS).rev() {
        let from = backup_path(path, gen);
        let to = backup_path(path, gen + 1);
        if from.exists() {
            fs::rename(&from, &to)?;
        }
    }
    fs::copy(path, backup_path(path, 1))?;
    Ok(())
}

fn backup_path(path: &Path, generation: u32) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    if generation == 1 {
        name.push(".bak");
    } else {
        name.push(format!(".bak.{generation}"));
    }
    PathBuf::from(name)
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
