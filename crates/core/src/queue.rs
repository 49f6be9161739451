// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The ring queue: a doubly linked, circular buffer of patch sets awaiting a
//! pipeline attempt.
//!
//! [`QueueRing`] is the in-memory algorithm; it holds no I/O of its own.
//! [`crate::event::Event::QueueItemInserted`] and friends record the inputs a
//! caller passed to these methods (never derived state), so replaying an event
//! against a ring built the same way reproduces the exact same links —
//! the insertion-target walk below depends only on current ring contents, never
//! on anything outside the ring.

use crate::ids::{PatchId, QueueItemId};
use std::collections::HashMap;
use thiserror::Error;

/// One entry in the ring: a patch set awaiting (or having had) a pipeline attempt.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct QueueItem {
    pub id: QueueItemId,
    pub patch_id: PatchId,
    pub message_id: String,
    pub prev: Option<QueueItemId>,
    pub next: Option<QueueItemId>,
    pub processed_at_ms: Option<u64>,
    pub ignored_at_ms: Option<u64>,
    pub last_base_commit: Option<String>,
}

impl QueueItem {
    fn new(id: QueueItemId, patch_id: PatchId, message_id: String) -> Self {
        Self {
            id,
            patch_id,
            message_id,
            prev: None,
            next: None,
            processed_at_ms: None,
            ignored_at_ms: None,
            last_base_commit: None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("queue item not found: {0}")]
    NotFound(QueueItemId),
}

/// Result of [`QueueRing::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// An item for this patch-id already carried this message-id; nothing changed.
    Unchanged(QueueItemId),
    /// A new item was linked into the ring (possibly after removing a stale one
    /// for the same patch-id with a different message-id).
    Inserted(QueueItemId),
}

impl InsertOutcome {
    pub fn item_id(&self) -> QueueItemId {
        match self {
            InsertOutcome::Unchanged(id) | InsertOutcome::Inserted(id) => *id,
        }
    }
}

/// The singleton ring queue.
#[derive(Debug, Default, Clone, serde::Serialize, serde::Deserialize)]
pub struct QueueRing {
    items: HashMap<QueueItemId, QueueItem>,
    by_patch: HashMap<PatchId, QueueItemId>,
    cursor: Option<QueueItemId>,
}

impl QueueRing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn cursor(&self) -> Option<QueueItemId> {
        self.cursor
    }

    pub fn get(&self, id: QueueItemId) -> Option<&QueueItem> {
        self.items.get(&id)
    }

    /// Item with `prev == None`. `None` only when the ring is empty.
    pub fn get_first(&self) -> Option<QueueItemId> {
        self.items.values().find(|i| i.prev.is_none()).map(|i| i.id)
    }

    /// Item with `next == None`. `None` only when the ring is empty.
    pub fn get_last(&self) -> Option<QueueItemId> {
        self.items.values().find(|i| i.next.is_none()).map(|i| i.id)
    }

    /// The item at the cursor, without mutation.
    pub fn peek(&self) -> Option<QueueItemId> {
        self.cursor
    }

    /// Walk the ring from `get_first` via `next` until exhausted (no wraparound).
    pub fn iter_from_first(&self) -> Vec<QueueItemId> {
        let mut out = Vec::with_capacity(self.items.len());
        let mut cur = self.get_first();
        while let Some(id) = cur {
            out.push(id);
            cur = self.items.get(&id).and_then(|i| i.next);
        }
        out
    }

    /// Insert (or re-enter) `patch_id` carrying `message_id`.
    ///
    /// `item_id` is the identifier to use if a new item is actually created;
    /// callers choose it before calling (so the same id can be recorded in an
    /// event and reused verbatim on replay). If the patch is already queued
    /// with the same message-id this is a no-op and the *existing* item's id
    /// is returned instead.
    pub fn insert(
        &mut self,
        item_id: QueueItemId,
        patch_id: PatchId,
        message_id: impl Into<String>,
        now_ms: u64,
    ) -> InsertOutcome {
        let message_id = message_id.into();

        if let Some(&existing_id) = self.by_patch.get(&patch_id) {
            // Existing borrow must end before we possibly call remove() below.
            let matches = self.items.get(&existing_id).map(|i| i.message_id == message_id);
            match matches {
                Some(true) => return InsertOutcome::Unchanged(existing_id),
                Some(false) => {
                    // Patch-set replacement: drop the old item, fall through to insert.
                    let _ = self.remove(existing_id);
                }
                None => {} // inconsistent index; fall through and repair by inserting
            }
        }

        if self.items.is_empty() {
            let item = QueueItem::new(item_id, patch_id, message_id);
            self.by_patch.insert(patch_id, item_id);
            self.items.insert(item_id, item);
            self.cursor = Some(item_id);
            return InsertOutcome::Inserted(item_id);
        }

        let target = self.find_insertion_target(now_ms);
        self.link_after(target, item_id, patch_id, message_id);
        InsertOutcome::Inserted(item_id)
    }

    /// The "fair position": the last item in the contiguous run of already
    /// processed items starting at the cursor (walking forward via `next`,
    /// wrapping once through `get_first`). If the cursor itself is unprocessed,
    /// that run is empty and the target is the cursor.
    fn find_insertion_target(&self, _now_ms: u64) -> QueueItemId {
        let cursor = match self.cursor {
            Some(c) => c,
            None => unreachable!("find_insertion_target called on a non-empty ring with no cursor"),
        };
        let mut target = cursor;
        let mut node = cursor;
        loop {
            let item = match self.items.get(&node) {
                Some(i) => i,
                None => break,
            };
            if item.processed_at_ms.is_none() {
                break;
            }
            target = node;
            let next = match item.next {
                Some(n) => n,
                None => match self.get_first() {
                    Some(f) => f,
                    None => break,
                },
            };
            if next == cursor {
                break;
            }
            node = next;
        }
        target
    }

    fn link_after(
        &mut self,
        target: QueueItemId,
        item_id: QueueItemId,
        patch_id: PatchId,
        message_id: String,
    ) {
        let mut item = QueueItem::new(item_id, patch_id, message_id);
        item.prev = Some(target);
        let target_next = self.items.get(&target).and_then(|i| i.next);
        item.next = target_next;
        if let Some(next_id) = target_next {
            if let Some(next) = self.items.get_mut(&next_id) {
                next.prev = Some(item_id);
            }
        }
        if let Some(t) = self.items.get_mut(&target) {
            t.next = Some(item_id);
        }
        self.by_patch.insert(patch_id, item_id);
        self.items.insert(item_id, item);
    }

    /// Unlink `item_id`, rewriting neighbors' pointers. Advances the cursor if
    /// it was pointing at the removed item.
    pub fn remove(&mut self, item_id: QueueItemId) -> Result<(), QueueError> {
        let item = self.items.remove(&item_id).ok_or(QueueError::NotFound(item_id))?;
        self.by_patch.remove(&item.patch_id);

        if let Some(prev_id) = item.prev {
            if let Some(prev) = self.items.get_mut(&prev_id) {
                prev.next = item.next;
            }
        }
        if let Some(next_id) = item.next {
            if let Some(next) = self.items.get_mut(&next_id) {
                next.prev = item.prev;
            }
        }

        if self.cursor == Some(item_id) {
            self.cursor = match item.next {
                Some(next_id) => Some(next_id),
                None => self.get_first(),
            };
        }

        Ok(())
    }

    /// Advance the cursor, marking the previously-current item processed.
    /// Skips (but still advances past) ignored items. Returns `(returned,
    /// new_current)`; both are `None` if the ring is empty or holds nothing
    /// but ignored items.
    pub fn get_and_advance(&mut self, now_ms: u64) -> (Option<QueueItemId>, Option<QueueItemId>) {
        let mut cur = match self.cursor {
            Some(c) => c,
            None => return (None, None),
        };

        // Bounded by ring length: each iteration marks one item processed, so
        // a full lap visits every item at most once. Without this bound a
        // ring of nothing but ignored items would loop forever.
        let mut remaining = self.items.len();

        loop {
            let next = match self.items.get(&cur).and_then(|i| i.next) {
                Some(n) => Some(n),
                None => self.get_first(),
            };
            self.cursor = next;

            let ignored = {
                let item = match self.items.get_mut(&cur) {
                    Some(i) => i,
                    None => return (None, None),
                };
                item.processed_at_ms = Some(now_ms);
                item.ignored_at_ms.is_some()
            };

            if !ignored {
                return (Some(cur), self.cursor);
            }

            remaining -= 1;
            match next {
                Some(n) if remaining > 0 => cur = n,
                _ => return (None, None),
            }
        }
    }

    pub fn set_ignored(&mut self, item_id: QueueItemId, now_ms: u64) -> bool {
        match self.items.get_mut(&item_id) {
            Some(item) => {
                item.ignored_at_ms = Some(now_ms);
                true
            }
            None => false,
        }
    }

    pub fn set_last_base_commit(&mut self, item_id: QueueItemId, sha: impl Into<String>) -> bool {
        match self.items.get_mut(&item_id) {
            Some(item) => {
                item.last_base_commit = Some(sha.into());
                true
            }
            None => false,
        }
    }

    pub fn find_by_patch(&self, patch_id: PatchId) -> Option<QueueItemId> {
        self.by_patch.get(&patch_id).copied()
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
