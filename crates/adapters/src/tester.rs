// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The local Tester: runs `meson test` against the repo directory the
//! Compiler built, mirroring `LocalCompiler` one async invocation deep
//! (§4.2: "Tester stage. Mirror of Compiler, one async test invocation.").
//!
//! There is no synchronous configure step here — `begin` only creates the
//! `Test` wrapper Task (completed immediately, it does no work of its own)
//! and a `RunTest` Task that `is_done` drives to completion on the next
//! poll, same shape as `LocalCompiler`'s `Ninja` Task.

use async_trait::async_trait;
use cfbot_core::{Branch, CommandType, Ledger, Status, TaskName};
use cfbot_engine::StageDriver;
use cfbot_shell::Cmd;
use std::path::PathBuf;
use std::time::Duration;

pub struct LocalTester {
    base_dir: PathBuf,
    test_timeout: Duration,
}

impl LocalTester {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into(), test_timeout: Duration::from_secs(1800) }
    }

    pub fn with_timeout(mut self, test_timeout: Duration) -> Self {
        self.test_timeout = test_timeout;
        self
    }

    fn repo_dir(&self, branch: &Branch) -> PathBuf {
        self.base_dir.join(branch.branch_id.to_string()).join("repo")
    }
}

#[async_trait]
impl StageDriver for LocalTester {
    async fn begin(&self, ledger: &mut dyn Ledger, branch: &Branch) -> bool {
        let test_task = cfbot_core::TaskId::new();
        if ledger.create_task(test_task, branch.branch_id, TaskName::Test, 1).is_err() {
            return false;
        }
        let _ = ledger.set_task_status(test_task, Status::Completed);

        let run_test_task = cfbot_core::TaskId::new();
        let _ = ledger.create_task(run_test_task, branch.branch_id, TaskName::RunTest, 2);
        true
    }

    async fn is_done(&self, ledger: &mut dyn Ledger, branch: &Branch) -> bool {
        let tasks = ledger.tasks_for_branch(branch.branch_id);
        if tasks.iter().all(|t| t.is_done()) {
            return true;
        }

        let Some(run_test_task) = ledger.first_task(branch.branch_id, TaskName::RunTest) else {
            return false;
        };
        if run_test_task.status != Status::Created {
            return false;
        }
        let _ = ledger.set_task_status(run_test_task.id, Status::Executing);

        let command_id = cfbot_core::CommandId::new();
        let _ = ledger.create_command(command_id, run_test_task.id, "meson test".to_string(), CommandType::TestTool);
        let _ = ledger.set_command_status(command_id, Status::Executing, None);

        let output = Cmd::new("meson")
            .args(["test", "-C", "build"])
            .cwd(self.repo_dir(branch))
            .timeout(self.test_timeout)
            .label("meson test")
            .run()
            .await;

        let ok = matches!(&output, Ok(o) if o.success);
        let _ = ledger.set_command_status(command_id, if ok { Status::Completed } else { Status::Failed }, None);
        let _ = ledger.set_task_status(run_test_task.id, if ok { Status::Completed } else { Status::Failed });

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
#[path = "tester_tests.rs"]
mod tests;
