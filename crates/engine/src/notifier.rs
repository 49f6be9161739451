// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The outbound half of the Notifier (§4.3): `branchTested` is a hook for
//! notifying interested parties (mailing-list reply, webhook) that a Branch
//! reached `finished`. It has no required core side-effects — those
//! (history, queue ignore/rebase/failing bookkeeping) are unconditional
//! Engine logic, not a pluggable collaborator, and live in
//! [`crate::step::PipelineEngine::step`].
//!
//! Notifier failures are best-effort: the Engine logs them and still
//! completes the transition, per §7's propagation policy.

use async_trait::async_trait;
use cfbot_core::Branch;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn branch_tested(&self, branch: &Branch);
}

/// Default Notifier: logs at info level and does nothing else. Sufficient
/// for a core that treats mail/webhook delivery as an external collaborator
/// (§1, out of scope).
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNotifier;

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn branch_tested(&self, branch: &Branch) {
        tracing::info!(
            patch_id = %branch.patch_id,
            branch_id = %branch.branch_id,
            commit_id = ?branch.commit_id,
            "branch tested and finished"
        );
    }
}

#[cfg(test)]
#[path = "notifier_tests.rs"]
mod tests;
