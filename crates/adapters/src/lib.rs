// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local-filesystem/subprocess `StageDriver` implementations: an `Applier`
//! that fetches and applies a patch set, a `Compiler` that runs `meson`/
//! `ninja`, and a `Tester` that runs `meson test`.
//!
//! These are the reference drivers `cfbotd` runs in production; nothing
//! about `cfbot-engine::PipelineEngine` depends on this crate, so an
//! alternate environment (containerized builds, a different build system)
//! could swap in its own `StageDriver` impls without touching the Engine.

pub mod applier;
pub mod attachment;
pub mod compiler;
pub mod error;
pub mod tester;

#[cfg(feature = "test-support")]
pub mod fake;

pub use applier::LocalApplier;
pub use attachment::{Attachment, AttachmentSource, AttachmentSourceError, JsonDirectoryAttachmentSource};
pub use compiler::LocalCompiler;
pub use error::{AdapterError, EnvironmentError};
pub use tester::LocalTester;

#[cfg(feature = "test-support")]
pub use fake::{FakeDriver, FakeOutcome};
