// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A thin async subprocess runner.
//!
//! This is not a shell-language interpreter: the pipeline stage drivers in
//! `cfbot-adapters` only ever need to run a fixed, known argv (git plumbing,
//! `meson`, `ninja`, the apply script) with a working directory and a
//! timeout, capture stdout/stderr, and get back an exit code. That's the
//! whole surface this crate exposes.

mod process;

pub use process::{CmdOutput, Cmd, ShellError};
