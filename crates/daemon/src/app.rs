// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The daemon's core: owns the [`Store`] and the [`PipelineEngine`], and
//! translates every [`Request`]/[`Query`] the listener receives into calls
//! against them. Both the Unix listener and the ticker hold an `Arc<Mutex<_>>`
//! of this so at most one caller touches the `Store` at a time, matching
//! §5's "no two ticks overlap for a single Branch" by simply serializing
//! all ticks (the corpus's daemon core reasons about one request at a time
//! the same way).

use crate::error::DaemonError;
use cfbot_core::{Branch, BranchId, Event, PatchId, QueueItemId, SystemClock};
use cfbot_engine::PipelineEngine;
use cfbot_storage::Store;
use cfbot_wire::{BranchDto, BranchHistoryDto, QueueItemDto, Response, TaskDto};

pub struct App {
    store: Store,
    engine: PipelineEngine<SystemClock>,
    clock: SystemClock,
}

impl App {
    pub fn new(store: Store, engine: PipelineEngine<SystemClock>, clock: SystemClock) -> Self {
        Self { store, engine, clock }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn checkpoint(&mut self) -> Result<(), DaemonError> {
        self.store.checkpoint()?;
        Ok(())
    }

    fn now_ms(&self) -> u64 {
        self.clock.epoch_ms()
    }

    fn find_branch_by_id(&self, branch_id: BranchId) -> Option<Branch> {
        self.store.state().branches.values().find(|b| b.branch_id == branch_id).cloned()
    }

    pub fn enqueue_patch(&mut self, patch_id: PatchId, message_id: String) -> Result<(), DaemonError> {
        let item_id = QueueItemId::new();
        let at_ms = self.now_ms();
        self.store.apply(Event::QueueItemInserted { item_id, patch_id, message_id, at_ms })?;
        Ok(())
    }

    /// One `getAndAdvance` call: read the `(returned, new_current)` pair off
    /// a clone of the ring (so reading it doesn't itself mutate anything),
    /// then apply the single `QueueAdvanced` event against the real store.
    /// If an item was returned, create the Branch that starts its pipeline
    /// attempt.
    pub fn get_and_move(&mut self) -> Result<(Option<QueueItemDto>, Option<QueueItemDto>), DaemonError> {
        let at_ms = self.now_ms();
        let mut ring = self.store.state().queue.clone();
        let (returned, new_current) = ring.get_and_advance(at_ms);

        self.store.apply(Event::QueueAdvanced { at_ms })?;

        if let Some(item_id) = returned {
            if let Some(item) = self.store.state().queue.get(item_id).cloned() {
                let branch_id = BranchId::new();
                let branch_name = format!("cf/{}", item.patch_id);
                self.store.apply(Event::BranchCreated { patch_id: item.patch_id, branch_id, branch_name, at_ms })?;
            }
        }

        let returned_dto = returned.and_then(|id| self.store.state().queue.get(id)).map(QueueItemDto::from);
        let new_current_dto = new_current.and_then(|id| self.store.state().queue.get(id)).map(QueueItemDto::from);
        Ok((returned_dto, new_current_dto))
    }

    pub async fn process_branch(&mut self, branch_id: BranchId) -> Result<Response, DaemonError> {
        let branch = self.find_branch_by_id(branch_id).ok_or_else(|| DaemonError::BranchNotFound(branch_id.to_string()))?;
        let result = self.engine.step(&mut self.store, branch.patch_id).await?;
        Ok(Response::Stepped { branch: BranchDto::from(&result.branch), delay_ms: result.delay.map(|d| d.as_millis() as u64) })
    }

    pub fn peek(&self) -> Option<QueueItemDto> {
        self.store.state().queue.peek().and_then(|id| self.store.state().queue.get(id)).map(QueueItemDto::from)
    }

    pub fn get_queue(&self) -> Vec<QueueItemDto> {
        self.store.state().queue.iter_from_first().into_iter().filter_map(|id| self.store.state().queue.get(id)).map(QueueItemDto::from).collect()
    }

    pub fn branches(&self) -> Vec<BranchDto> {
        let mut branches: Vec<&Branch> = self.store.state().branches.values().collect();
        branches.sort_by_key(|b| b.patch_id);
        branches.into_iter().map(BranchDto::from).collect()
    }

    pub fn tasks(&self, branch_id: BranchId) -> Vec<TaskDto> {
        let mut tasks: Vec<TaskDto> =
            self.store.state().tasks.values().filter(|t| t.branch_id == branch_id).map(TaskDto::from).collect();
        tasks.sort_by_key(|t| t.position);
        tasks
    }

    /// Reverse-chronological: most recently recorded transition first.
    pub fn branch_history(&self, branch_id: BranchId) -> Vec<BranchHistoryDto> {
        let Some(patch_id) = self.find_branch_by_id(branch_id).map(|b| b.patch_id) else {
            return Vec::new();
        };
        let mut entries: Vec<BranchHistoryDto> =
            self.store.state().branch_history.iter().filter(|r| r.patch_id == patch_id).map(BranchHistoryDto::from).collect();
        entries.reverse();
        entries
    }

    /// One pass over every non-terminal Branch, stepping each once. Called
    /// by the ticker; exposed here so it shares the same `Store`/`Engine`
    /// serialization as request handling.
    pub async fn tick(&mut self) -> Result<usize, DaemonError> {
        let patch_ids: Vec<PatchId> = self
            .store
            .state()
            .branches
            .values()
            .filter(|b| !b.status.is_terminal())
            .map(|b| b.patch_id)
            .collect();

        let mut stepped = 0;
        for patch_id in patch_ids {
            self.engine.step(&mut self.store, patch_id).await?;
            stepped += 1;
        }
        Ok(stepped)
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
