// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use cfbot_core::ledger::LedgerError;
use cfbot_shell::ShellError;
use thiserror::Error;

/// Environment-setup failures that make a stage driver's `begin` return
/// `false` (§7's `EnvironmentError`), rather than a Task-level failure.
#[derive(Debug, Error)]
pub enum EnvironmentError {
    #[error("base directory {0} does not exist")]
    MissingBaseDir(String),
    #[error("template directory {0} does not exist")]
    MissingTemplateDir(String),
    #[error("template directory {0} is empty")]
    EmptyTemplateDir(String),
    #[error("template directory {0} has no .git directory")]
    TemplateNotAGitRepo(String),
    #[error("apply script {0} does not exist")]
    MissingApplyScript(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Shell(#[from] ShellError),
}

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Shell(#[from] ShellError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
