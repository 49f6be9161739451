// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The stage driver contract (§4.2): `begin` / `is_done` / `did_fail` /
//! `get_delay`, implemented once per pipeline stage. `cfbot-adapters`
//! provides the local-subprocess reference implementation; tests substitute
//! fakes.
//!
//! All three stages share the exact same method shape, so there is one
//! trait, `StageDriver`. `Applier`/`Compiler`/`Tester` are supertrait-bound
//! marker traits purely for documentation and for giving
//! [`crate::step::PipelineEngine`]'s three driver slots distinct types.

use async_trait::async_trait;
use cfbot_core::{Branch, Ledger};
use std::time::Duration;

/// One pipeline stage's driver: launch work, poll it, and report failure.
///
/// `begin`/`is_done`/`did_fail` are given `&mut dyn Ledger` so they can
/// create/advance Tasks and Commands as sub-steps complete; `get_delay`
/// never mutates anything and so only sees the Branch.
#[async_trait]
pub trait StageDriver: Send + Sync {
    /// Launch the stage's work. Returns `true` on successful initiation;
    /// `false` means the Engine should move the Branch straight to the
    /// stage's `-aborted` terminal (e.g. a missing template directory).
    async fn begin(&self, ledger: &mut dyn Ledger, branch: &Branch) -> bool;

    /// Poll whether every Task this stage owns has reached a terminal
    /// status. May create secondary Tasks/Commands as sub-steps complete.
    async fn is_done(&self, ledger: &mut dyn Ledger, branch: &Branch) -> bool;

    /// Called only after `is_done` returns `true`. Inspects the stage's
    /// Tasks for a failure status. The Applier additionally writes
    /// `branch`'s apply-result fields (patch count, diff stats, commit ids)
    /// through `ledger.record_apply_result` on success, and returns `true`
    /// if doing so itself fails.
    async fn did_fail(&self, ledger: &mut dyn Ledger, branch: &Branch) -> bool;

    /// How long the caller should wait before ticking this Branch again.
    /// `None` means no automatic re-tick is scheduled.
    fn get_delay(&self, branch: &Branch) -> Option<Duration>;
}

/// Marker for the Applier stage driver slot.
pub trait Applier: StageDriver {}
impl<T: StageDriver + ?Sized> Applier for T {}

/// Marker for the Compiler stage driver slot.
pub trait Compiler: StageDriver {}
impl<T: StageDriver + ?Sized> Compiler for T {}

/// Marker for the Tester stage driver slot.
pub trait Tester: StageDriver {}
impl<T: StageDriver + ?Sized> Tester for T {}
