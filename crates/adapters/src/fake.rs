// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory `StageDriver` stand-in for `cfbot-engine`/`cfbot-daemon` tests,
//! mirroring the teacher's `Fake*Driver` convention: a configurable outcome
//! instead of a real subprocess, gated behind `test-support` so it never
//! ships in `cfbotd`.

use async_trait::async_trait;
use cfbot_core::{Branch, Ledger};
use cfbot_engine::StageDriver;
use parking_lot::Mutex;
use std::time::Duration;

/// What a [`FakeDriver`] should report once its poll budget is spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeOutcome {
    /// `begin` returns `true`, `did_fail` returns `false`.
    Succeed,
    /// `begin` returns `true`, `did_fail` returns `true`.
    Fail,
    /// `begin` itself returns `false` (the stage's `-aborted` terminal).
    AbortOnBegin,
}

/// A `StageDriver` whose `is_done` stays `false` for `polls_before_done`
/// calls, then reports `FakeOutcome` forever after.
pub struct FakeDriver {
    outcome: FakeOutcome,
    polls_before_done: u32,
    remaining: Mutex<u32>,
    delay: Option<Duration>,
}

impl FakeDriver {
    pub fn new(outcome: FakeOutcome) -> Self {
        Self { outcome, polls_before_done: 0, remaining: Mutex::new(0), delay: None }
    }

    /// Make `is_done` return `false` this many times before reporting done.
    pub fn with_polls(mut self, polls_before_done: u32) -> Self {
        self.polls_before_done = polls_before_done;
        self.remaining = Mutex::new(polls_before_done);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl StageDriver for FakeDriver {
    async fn begin(&self, _ledger: &mut dyn Ledger, _branch: &Branch) -> bool {
        *self.remaining.lock() = self.polls_before_done;
        !matches!(self.outcome, FakeOutcome::AbortOnBegin)
    }

    async fn is_done(&self, _ledger: &mut dyn Ledger, _branch: &Branch) -> bool {
        let mut remaining = self.remaining.lock();
        if *remaining == 0 {
            true
        } else {
            *remaining -= 1;
            false
        }
    }

    async fn did_fail(&self, _ledger: &mut dyn Ledger, _branch: &Branch) -> bool {
        matches!(self.outcome, FakeOutcome::Fail)
    }

    fn get_delay(&self, _branch: &Branch) -> Option<Duration> {
        self.delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfbot_core::test_support::InMemoryLedger;
    use cfbot_core::{Branch, BranchId, PatchId};

    fn branch() -> Branch {
        Branch::new(PatchId(1), BranchId::new(), "cf/1".to_string(), 0)
    }

    #[tokio::test]
    async fn succeeds_after_its_poll_budget() {
        let driver = FakeDriver::new(FakeOutcome::Succeed).with_polls(2);
        let mut ledger = InMemoryLedger::new();
        let b = branch();
        assert!(driver.begin(&mut ledger, &b).await);
        assert!(!driver.is_done(&mut ledger, &b).await);
        assert!(!driver.is_done(&mut ledger, &b).await);
        assert!(driver.is_done(&mut ledger, &b).await);
        assert!(!driver.did_fail(&mut ledger, &b).await);
    }

    #[tokio::test]
    async fn abort_on_begin_short_circuits() {
        let driver = FakeDriver::new(FakeOutcome::AbortOnBegin);
        let mut ledger = InMemoryLedger::new();
        let b = branch();
        assert!(!driver.begin(&mut ledger, &b).await);
    }

    #[tokio::test]
    async fn fail_outcome_reports_failure() {
        let driver = FakeDriver::new(FakeOutcome::Fail);
        let mut ledger = InMemoryLedger::new();
        let b = branch();
        assert!(driver.begin(&mut ledger, &b).await);
        assert!(driver.is_done(&mut ledger, &b).await);
        assert!(driver.did_fail(&mut ledger, &b).await);
    }
}
