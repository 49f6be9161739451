// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The local Compiler: runs `meson setup` synchronously, then `ninja`,
//! against the repo directory the Applier left behind.
//!
//! Grounded on `LocalPatchCompiler`: `begin` creates the `Compile` wrapper
//! Task and runs configure inline; a configure failure fails the Compile
//! Task directly (there is no separate Configure Task in this vocabulary,
//! only a `CommandType::Configure` Command — see `SPEC_FULL.md` §2's
//! Compile/Test task-naming note) so `did_fail`'s Task sweep catches it
//! without a special case. A successful configure creates a `Ninja` Task
//! that `is_done` drives to completion one poll later, mirroring
//! `LocalApplier::is_done`'s synchronous-then-poll-again shape.

use async_trait::async_trait;
use cfbot_core::{Branch, CommandType, Ledger, Status, TaskName};
use cfbot_engine::StageDriver;
use cfbot_shell::Cmd;
use std::path::PathBuf;
use std::time::Duration;

pub struct LocalCompiler {
    base_dir: PathBuf,
    configure_timeout: Duration,
    build_timeout: Duration,
}

impl LocalCompiler {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into(), configure_timeout: Duration::from_secs(300), build_timeout: Duration::from_secs(1800) }
    }

    pub fn with_timeouts(mut self, configure_timeout: Duration, build_timeout: Duration) -> Self {
        self.configure_timeout = configure_timeout;
        self.build_timeout = build_timeout;
        self
    }

    fn repo_dir(&self, branch: &Branch) -> PathBuf {
        self.base_dir.join(branch.branch_id.to_string()).join("repo")
    }

    fn install_dir(&self, branch: &Branch) -> PathBuf {
        self.base_dir.join(branch.branch_id.to_string()).join("install")
    }
}

#[async_trait]
impl StageDriver for LocalCompiler {
    async fn begin(&self, ledger: &mut dyn Ledger, branch: &Branch) -> bool {
        let compile_task = cfbot_core::TaskId::new();
        if ledger.create_task(compile_task, branch.branch_id, TaskName::Compile, 1).is_err() {
            return false;
        }
        let _ = ledger.set_task_status(compile_task, Status::Executing);

        let repo_dir = self.repo_dir(branch);
        let install_dir = self.install_dir(branch);
        let configure_command = cfbot_core::CommandId::new();
        let _ = ledger.create_command(configure_command, compile_task, "meson setup".to_string(), CommandType::Configure);
        let _ = ledger.set_command_status(configure_command, Status::Executing, None);

        let output = Cmd::new("meson")
            .args(["setup", "build", "--prefix"])
            .arg(install_dir.to_string_lossy().into_owned())
            .cwd(&repo_dir)
            .timeout(self.configure_timeout)
            .label("meson setup")
            .run()
            .await;

        let configure_ok = matches!(&output, Ok(o) if o.success);
        let _ = ledger.set_command_status(configure_command, if configure_ok { Status::Completed } else { Status::Failed }, None);

        if configure_ok {
            let _ = ledger.set_task_status(compile_task, Status::Completed);
            let ninja_task = cfbot_core::TaskId::new();
            let _ = ledger.create_task(ninja_task, branch.branch_id, TaskName::Ninja, 2);
        } else {
            let _ = ledger.set_task_status(compile_task, Status::Failed);
        }

        true
    }

    async fn is_done(&self, ledger: &mut dyn Ledger, branch: &Branch) -> bool {
        let tasks = ledger.tasks_for_branch(branch.branch_id);
        if tasks.iter().all(|t| t.is_done()) {
            return true;
        }

        let Some(ninja_task) = ledger.first_task(branch.branch_id, TaskName::Ninja) else {
            return false;
        };
        if ninja_task.status != Status::Created {
            return false;
        }
        let _ = ledger.set_task_status(ninja_task.id, Status::Executing);

        let command_id = cfbot_core::CommandId::new();
        let _ = ledger.create_command(command_id, ninja_task.id, "ninja".to_string(), CommandType::BuildTool);
        let _ = ledger.set_command_status(command_id, Status::Executing, None);

        let output = Cmd::new("ninja")
            .cwd(self.repo_dir(branch).join("build"))
            .timeout(self.build_timeout)
            .label("ninja")
            .run()
            .await;

        let ok = matches!(&output, Ok(o) if o.success);
        let _ = ledger.set_command_status(command_id, if ok { Status::Completed } else { Status::Failed }, None);
        let _ = ledger.set_task_status(ninja_task.id, if ok { Status::Completed } else { Status::Failed });

        false
    }

    async fn did_fail(&self, ledger: &mut dyn Ledger, branch: &Branch) -> bool {
        ledger.tasks_for_branch(branch.branch_id).iter().any(|t| t.is_failure())
    }

    fn get_delay(&self, _branch: &Branch) -> Option<Duration> {
        None
    }
}

#[cfg(test)]
#[path = "compiler_tests.rs"]
mod tests;
