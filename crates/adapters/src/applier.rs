// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The local-filesystem Applier: fetches a patch set's files, applies them
//! on top of a freshly checked-out template repository, and folds the
//! result into a merge commit.
//!
//! Grounded on `LocalPatchApplier`/`PatchApplierTemplate`: `begin` checks out
//! a clean working tree and downloads attachments; `is_done` runs the apply
//! script once downloads finish; `did_fail` computes diff stats and performs
//! the merge-commit step.

use crate::attachment::AttachmentSource;
use async_trait::async_trait;
use cfbot_core::{Branch, CommandType, Ledger, Payload, Status, TaskName};
use cfbot_engine::StageDriver;
use cfbot_shell::Cmd;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Duration;

fn additions_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)] // pattern is a fixed literal, never fails to compile
    RE.get_or_init(|| Regex::new(r"(\d+) insertion").expect("static pattern"))
}

fn deletions_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)] // pattern is a fixed literal, never fails to compile
    RE.get_or_init(|| Regex::new(r"(\d+) deletion").expect("static pattern"))
}

fn payload(pairs: impl IntoIterator<Item = (&'static str, serde_json::Value)>) -> Payload {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

/// Where the Applier stages a branch's working tree and checked-out repo.
struct BranchPaths {
    working_dir: PathBuf,
    repo_dir: PathBuf,
}

pub struct LocalApplier {
    base_dir: PathBuf,
    template_dir: PathBuf,
    apply_script_path: PathBuf,
    file_fetch_url_base: String,
    http: reqwest::Client,
    attachments: Arc<dyn AttachmentSource>,
}

impl LocalApplier {
    const APPLY_SCRIPT_NAME: &'static str = "apply-one-patch.sh";

    pub fn new(
        base_dir: impl Into<PathBuf>,
        template_dir: impl Into<PathBuf>,
        apply_script_path: impl Into<PathBuf>,
        file_fetch_url_base: impl Into<String>,
        attachments: Arc<dyn AttachmentSource>,
    ) -> Self {
        Self {
            base_dir: base_dir.into(),
            template_dir: template_dir.into(),
            apply_script_path: apply_script_path.into(),
            file_fetch_url_base: file_fetch_url_base.into(),
            http: reqwest::Client::new(),
            attachments,
        }
    }

    fn paths(&self, branch: &Branch) -> BranchPaths {
        let branch_subdir = self.base_dir.join(branch.branch_id.to_string());
        BranchPaths { working_dir: branch_subdir.join("work"), repo_dir: branch_subdir.join("repo") }
    }

    /// Re-creates the working/repo directories, stages the apply script, and
    /// checks out a fresh `cf/<patch-id>` branch. Any failure here means
    /// `begin` returns `false`, producing `applying-aborted`.
    async fn initialize_directories(&self, branch: &Branch) -> Result<BranchPaths, crate::error::EnvironmentError> {
        use crate::error::EnvironmentError as E;

        if !self.base_dir.exists() {
            return Err(E::MissingBaseDir(self.base_dir.display().to_string()));
        }
        if !self.template_dir.exists() {
            return Err(E::MissingTemplateDir(self.template_dir.display().to_string()));
        }
        let non_empty = std::fs::read_dir(&self.template_dir)?.next().is_some();
        if !non_empty {
            return Err(E::EmptyTemplateDir(self.template_dir.display().to_string()));
        }
        if !self.template_dir.join(".git").exists() {
            return Err(E::TemplateNotAGitRepo(self.template_dir.display().to_string()));
        }
        if !self.apply_script_path.exists() {
            return Err(E::MissingApplyScript(self.apply_script_path.display().to_string()));
        }

        let paths = self.paths(branch);
        let branch_subdir = self.base_dir.join(branch.branch_id.to_string());
        if branch_subdir.exists() {
            std::fs::remove_dir_all(&branch_subdir)?;
        }
        std::fs::create_dir_all(&paths.working_dir)?;
        copy_dir_recursive(&self.template_dir, &paths.repo_dir)?;
        std::fs::copy(&self.apply_script_path, paths.working_dir.join(Self::APPLY_SCRIPT_NAME))?;

        Cmd::new("git")
            .args(["-C", paths.repo_dir.to_string_lossy().as_ref(), "config", "user.name", "Commitfest Bot"])
            .run()
            .await?;
        Cmd::new("git")
            .args(["-C", paths.repo_dir.to_string_lossy().as_ref(), "config", "user.email", "cfbot@cputube.org"])
            .run()
            .await?;
        let branch_ref = format!("cf/{}", branch.patch_id);
        let _ = Cmd::new("git")
            .args(["-C", paths.repo_dir.to_string_lossy().as_ref(), "branch", "--quiet", "-D", &branch_ref])
            .run()
            .await;
        Cmd::new("git")
            .args(["-C", paths.repo_dir.to_string_lossy().as_ref(), "checkout", "--quiet", "-b", &branch_ref])
            .run()
            .await?;

        Ok(paths)
    }

    async fn download_and_save(&self, working_dir: &Path, filename: &str, attachment_id: u64) -> bool {
        let url = format!("{}{}/{}", self.file_fetch_url_base, attachment_id, filename);
        let file_path = working_dir.join(filename);
        match self.http.get(&url).send().await.and_then(reqwest::Response::error_for_status) {
            Ok(response) => match response.bytes().await {
                Ok(bytes) => tokio::fs::write(&file_path, &bytes).await.is_ok(),
                Err(_) => false,
            },
            Err(_) => false,
        }
    }

    /// Runs the apply script against one downloaded patch file.
    async fn perform_apply(&self, working_dir: &Path, repo_dir: &Path, filename: &str) -> Result<(), String> {
        let file_path = working_dir.join(filename);
        if !file_path.exists() {
            return Err(format!("{filename} does not exist in the working directory"));
        }
        let output = Cmd::new(format!("./{}", Self::APPLY_SCRIPT_NAME))
            .arg(filename)
            .arg(repo_dir.to_string_lossy().into_owned())
            .cwd(working_dir)
            .label("apply-one-patch.sh")
            .run()
            .await
            .map_err(|e| e.to_string())?;
        if output.success {
            Ok(())
        } else {
            Err(output.stderr)
        }
    }

    async fn git_shortstat(&self, repo_dir: &Path, from: &str, to: &str) -> Result<(u64, u64), String> {
        let output = Cmd::new("git")
            .args(["-C", repo_dir.to_string_lossy().as_ref(), "diff", "--shortstat", from, to])
            .run()
            .await
            .map_err(|e| e.to_string())?;
        if !output.success {
            return Err(output.stderr);
        }
        let additions =
            additions_pattern().captures(&output.stdout).and_then(|c| c.get(1)).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
        let deletions =
            deletions_pattern().captures(&output.stdout).and_then(|c| c.get(1)).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
        Ok((additions, deletions))
    }

    async fn rev_parse(&self, repo_dir: &Path, rev: &str) -> Result<String, String> {
        let output =
            Cmd::new("git").args(["-C", repo_dir.to_string_lossy().as_ref(), "rev-parse", rev]).run().await.map_err(|e| e.to_string())?;
        if !output.success {
            return Err(output.stderr);
        }
        Ok(output.stdout.trim().to_string())
    }

    async fn convert_to_merge_commit(&self, repo_dir: &Path, working_dir: &Path, branch: &Branch) -> Result<String, String> {
        let commit_id = self.rev_parse(repo_dir, "HEAD").await?;
        let msg_path = working_dir.join("merge_commit_msg.txt");
        let message = format!(
            "Merge branch '{}' into master\n\nPatch ID: {}\nBranch ID: {}\nCommit ID: {}\n",
            branch.branch_name, branch.patch_id, branch.branch_id, commit_id
        );
        std::fs::write(&msg_path, message).map_err(|e| e.to_string())?;

        let reset = Cmd::new("git")
            .args(["-C", repo_dir.to_string_lossy().as_ref(), "reset", "origin/master", "--hard", "--quiet"])
            .run()
            .await
            .map_err(|e| e.to_string())?;
        if !reset.success {
            return Err(reset.stderr);
        }
        let merge = Cmd::new("git")
            .args([
                "-C",
                repo_dir.to_string_lossy().as_ref(),
                "merge",
                "--no-ff",
                "--quiet",
                "-F",
                msg_path.to_string_lossy().as_ref(),
                &commit_id,
            ])
            .run()
            .await
            .map_err(|e| e.to_string())?;
        if !merge.success {
            return Err(merge.stderr);
        }
        Ok(commit_id)
    }
}

#[async_trait]
impl StageDriver for LocalApplier {
    async fn begin(&self, ledger: &mut dyn Ledger, branch: &Branch) -> bool {
        if !ledger.tasks_for_branch(branch.branch_id).is_empty() {
            return false;
        }

        let paths = match self.initialize_directories(branch).await {
            Ok(paths) => paths,
            Err(e) => {
                tracing::warn!(patch_id = %branch.patch_id, error = %e, "applier environment setup failed");
                return false;
            }
        };

        let download_task = cfbot_core::TaskId::new();
        if ledger.create_task(download_task, branch.branch_id, TaskName::Download, 1).is_err() {
            return false;
        }

        let attachments = match self.attachments.attachments_for_patch(branch.patch_id).await {
            Ok(a) => a,
            Err(e) => {
                let _ = ledger.set_task_status(download_task, Status::Aborted);
                let _ = ledger.set_task_payload(download_task, payload([("error", serde_json::json!(e.to_string()))]));
                return true;
            }
        };

        let mut patch_filenames = Vec::new();
        let mut fail_count = 0u32;
        for attachment in &attachments {
            if attachment.is_patch && fail_count == 0 {
                let ok = self.download_and_save(&paths.working_dir, &attachment.filename, attachment.attachment_id).await;
                let command_id = cfbot_core::CommandId::new();
                let _ = ledger.create_command(command_id, download_task, attachment.filename.clone(), CommandType::PatchsetFile);
                let _ = ledger.set_command_status(command_id, if ok { Status::Completed } else { Status::Failed }, Some(0));
                if ok {
                    patch_filenames.push(attachment.filename.clone());
                } else {
                    fail_count += 1;
                }
            } else {
                let command_id = cfbot_core::CommandId::new();
                let _ = ledger.create_command(command_id, download_task, attachment.filename.clone(), CommandType::OtherFile);
                let _ = ledger.set_command_status(command_id, Status::Completed, Some(0));
            }
        }
        patch_filenames.sort();

        if fail_count == 0 {
            let apply_task = cfbot_core::TaskId::new();
            if ledger.create_task(apply_task, branch.branch_id, TaskName::Apply, 2).is_ok() {
                for filename in &patch_filenames {
                    let command_id = cfbot_core::CommandId::new();
                    let _ = ledger.create_command(command_id, apply_task, filename.clone(), CommandType::ApplyPatch);
                }
            }
        }

        let _ = ledger.set_task_status(download_task, if fail_count == 0 { Status::Completed } else { Status::Failed });
        true
    }

    async fn is_done(&self, ledger: &mut dyn Ledger, branch: &Branch) -> bool {
        let tasks = ledger.tasks_for_branch(branch.branch_id);
        if tasks.iter().all(|t| t.is_done()) {
            return true;
        }

        let Some(apply_task) = ledger.first_task(branch.branch_id, TaskName::Apply) else {
            return false;
        };
        if apply_task.status != Status::Created {
            return false;
        }
        let _ = ledger.set_task_status(apply_task.id, Status::Executing);

        let paths = self.paths(branch);
        let mut commands = ledger.commands_for_task(apply_task.id, Some(CommandType::ApplyPatch));
        commands.sort_by(|a, b| a.name.cmp(&b.name));

        let mut has_failed = false;
        for command in commands {
            let _ = ledger.set_command_status(command.id, Status::Executing, None);
            if !has_failed {
                match self.perform_apply(&paths.working_dir, &paths.repo_dir, &command.name).await {
                    Ok(()) => {
                        let _ = ledger.set_command_status(command.id, Status::Completed, None);
                    }
                    Err(e) => {
                        has_failed = true;
                        let _ = ledger.set_command_status(command.id, Status::Failed, None);
                        tracing::info!(patch_id = %branch.patch_id, file = %command.name, error = %e, "patch apply failed");
                    }
                }
            } else {
                let _ = ledger.set_command_status(command.id, Status::Completed, None);
            }
        }

        let _ = ledger.set_task_status(apply_task.id, if has_failed { Status::Failed } else { Status::Completed });
        false
    }

    async fn did_fail(&self, ledger: &mut dyn Ledger, branch: &Branch) -> bool {
        let tasks = ledger.tasks_for_branch(branch.branch_id);
        if tasks.iter().any(|t| t.is_failure()) {
            return true;
        }

        let paths = self.paths(branch);
        let patch_count = ledger
            .first_task(branch.branch_id, TaskName::Apply)
            .map(|t| ledger.commands_for_task(t.id, Some(CommandType::ApplyPatch)).len() as u32)
            .unwrap_or(0);
        if patch_count == 0 {
            return true;
        }

        let first_stat = match self.git_shortstat(&paths.repo_dir, "origin/master", &format!("HEAD~{}", patch_count - 1)).await {
            Ok(s) => s,
            Err(_) => return true,
        };
        let all_stat = match self.git_shortstat(&paths.repo_dir, "origin/master", "HEAD").await {
            Ok(s) => s,
            Err(_) => return true,
        };

        let commit_id = match self.convert_to_merge_commit(&paths.repo_dir, &paths.working_dir, branch).await {
            Ok(id) => id,
            Err(_) => return true,
        };
        let base_commit = match self.rev_parse(&paths.repo_dir, "origin/master").await {
            Ok(sha) => sha,
            Err(_) => return true,
        };

        ledger
            .record_apply_result(
                branch.patch_id,
                patch_count,
                first_stat.0,
                first_stat.1,
                all_stat.0,
                all_stat.1,
                commit_id,
                base_commit,
            )
            .is_err()
    }

    fn get_delay(&self, _branch: &Branch) -> Option<Duration> {
        None
    }
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let dest_path = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &dest_path)?;
        } else {
            std::fs::copy(entry.path(), &dest_path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "applier_tests.rs"]
mod tests;
