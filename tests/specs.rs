// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end specs driving the real `cfbotd`/`cfbot` binaries over a Unix
//! socket, covering the end-to-end scenarios: single-patch happy path,
//! patch-set replacement, apply-aborted on a broken environment, and two
//! branches progressing independently.

use assert_cmd::Command;
use serde_json::Value;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::Child;
use std::time::{Duration, Instant};
use tempfile::TempDir;

const READY_WAIT_MAX_MS: u64 = 5_000;
const DRIVE_WAIT_MAX_MS: u64 = 20_000;

fn wait_for(max_ms: u64, mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_millis(max_ms);
    loop {
        if check() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}

/// A running `cfbotd`, killed on drop. `_root` keeps its temp directory
/// alive for the daemon's lifetime.
struct Daemon {
    child: Child,
    socket_path: PathBuf,
    _root: TempDir,
}

impl Drop for Daemon {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Spawns `cfbotd` against a fresh temp data/base/attachments directory,
/// with a tick interval long enough that the background ticker never fires
/// during a test, so only explicit `cfbot move`/`process-branch` calls
/// advance state. `overrides` layer on top of (and can replace) the
/// defaults for `CFBOTD_TEMPLATE_DIR`, `CFBOTD_APPLY_SCRIPT_PATH`,
/// `FILE_FETCH_URL_BASE` and `PATH`.
fn spawn_daemon(overrides: &[(&str, String)]) -> Daemon {
    let root = tempfile::tempdir().unwrap();
    let socket_path = root.path().join("cfbotd.sock");

    let mut cmd = Command::cargo_bin("cfbotd").unwrap();
    cmd.env("CFBOTD_DATA_DIR", root.path().join("data"))
        .env("CFBOTD_SOCKET_PATH", &socket_path)
        .env("LOCAL_PATCH_BURNER_DIR", root.path().join("base"))
        .env("CFBOTD_TEMPLATE_DIR", root.path().join("no-such-template"))
        .env("CFBOTD_APPLY_SCRIPT_PATH", root.path().join("no-such-apply-script.sh"))
        .env("CFBOTD_ATTACHMENTS_DIR", root.path().join("attachments"))
        .env("FILE_FETCH_URL_BASE", "http://127.0.0.1:1/")
        .env("CFBOTD_TICK_INTERVAL_MS", "3600000")
        .env_remove("RUST_LOG");
    std::fs::create_dir_all(root.path().join("attachments")).unwrap();

    for (key, value) in overrides {
        cmd.env(key, value);
    }

    let child = cmd.spawn().expect("spawn cfbotd");
    let daemon = Daemon { child, socket_path, _root: root };

    let ready = wait_for(READY_WAIT_MAX_MS, || {
        Command::cargo_bin("cfbot").unwrap().args(["--socket"]).arg(&daemon.socket_path).arg("ping").ok().is_ok()
    });
    assert!(ready, "cfbotd should come up and answer ping within {READY_WAIT_MAX_MS}ms");
    daemon
}

fn cfbot_json(socket_path: &Path, args: &[&str]) -> Value {
    let output = Command::cargo_bin("cfbot")
        .unwrap()
        .arg("--socket")
        .arg(socket_path)
        .arg("--format")
        .arg("json")
        .args(args)
        .output()
        .expect("run cfbot");
    assert!(output.status.success(), "cfbot {args:?} failed: {}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| panic!("cfbot {args:?} produced non-JSON output: {e}"))
}

fn cfbot_ok(socket_path: &Path, args: &[&str]) {
    Command::cargo_bin("cfbot").unwrap().arg("--socket").arg(socket_path).args(args).assert().success();
}

fn enqueue(socket_path: &Path, patch_id: i64, message_id: &str) {
    cfbot_ok(socket_path, &["enqueue", "--patch-id", &patch_id.to_string(), "--message-id", message_id]);
}

/// Calls `cfbot move`, returning `(returned, new_current)` as raw JSON
/// values (each either `null` or a `QueueItemDto` object).
fn do_move(socket_path: &Path) -> (Value, Value) {
    let result = cfbot_json(socket_path, &["move"]);
    let pair = result.as_array().expect("move result is a two-element array");
    (pair[0].clone(), pair[1].clone())
}

fn branches(socket_path: &Path) -> Vec<Value> {
    cfbot_json(socket_path, &["branches"]).as_array().expect("branches is an array").clone()
}

fn branch_id_for_patch(socket_path: &Path, patch_id: i64) -> String {
    branches(socket_path)
        .into_iter()
        .find(|b| b["patch_id"].as_i64() == Some(patch_id))
        .unwrap_or_else(|| panic!("no branch found for patch {patch_id}"))["branch_id"]
        .as_str()
        .unwrap()
        .to_string()
}

/// Steps one branch's pipeline forward once, returning its new status.
fn process_branch(socket_path: &Path, branch_id: &str) -> String {
    let result = cfbot_json(socket_path, &["process-branch", "--branch-id", branch_id]);
    let pair = result.as_array().expect("process-branch result is a two-element array");
    pair[0]["status"].as_str().unwrap().to_string()
}

fn history_statuses(socket_path: &Path, branch_id: &str) -> Vec<String> {
    cfbot_json(socket_path, &["history", "--branch-id", branch_id])
        .as_array()
        .expect("history is an array")
        .iter()
        .map(|row| row["status"].as_str().unwrap().to_string())
        .collect()
}

const TERMINAL_SUFFIXES: [&str; 6] =
    ["applying-failed", "applying-aborted", "compiling-failed", "compiling-aborted", "testing-failed", "testing-aborted"];

/// Repeatedly steps `branch_id` until it reaches `finished` or any terminal
/// failure status, returning every status observed in call order.
fn drive_to_terminal(socket_path: &Path, branch_id: &str) -> Vec<String> {
    let mut statuses = Vec::new();
    let reached = wait_for(DRIVE_WAIT_MAX_MS, || {
        let status = process_branch(socket_path, branch_id);
        let terminal = status == "finished" || TERMINAL_SUFFIXES.contains(&status.as_str());
        statuses.push(status);
        terminal
    });
    assert!(reached, "branch {branch_id} never reached a terminal status, saw: {statuses:?}");
    statuses
}

/// Everything a realistic Applier/Compiler/Tester run needs: a template git
/// repository with a fake `origin/master`, an apply script that applies a
/// patch and commits it, and `meson`/`ninja` stand-ins on `PATH` so the
/// Compile/Test stages succeed without a real build toolchain.
struct PipelineFixture {
    _root: TempDir,
    template_dir: PathBuf,
    apply_script_path: PathBuf,
    stub_bin_dir: PathBuf,
    attachment_port: u16,
}

const PATCH_BODY: &str = "diff --git a/README.md b/README.md\n\
index 0000000..1111111 100644\n\
--- a/README.md\n\
+++ b/README.md\n\
@@ -1 +1 @@\n\
-hello\n\
+hello world\n";

fn run(cmd: &mut std::process::Command) {
    let status = cmd.status().unwrap_or_else(|e| panic!("failed to run {cmd:?}: {e}"));
    assert!(status.success(), "{cmd:?} exited with {status}");
}

#[cfg(unix)]
fn make_executable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms).unwrap();
}

fn build_pipeline_fixture() -> PipelineFixture {
    let root = tempfile::tempdir().unwrap();

    let template_dir = root.path().join("template");
    std::fs::create_dir_all(&template_dir).unwrap();
    run(std::process::Command::new("git").args(["init", "-q"]).current_dir(&template_dir));
    run(std::process::Command::new("git").args(["config", "user.email", "test@example.com"]).current_dir(&template_dir));
    run(std::process::Command::new("git").args(["config", "user.name", "Test"]).current_dir(&template_dir));
    std::fs::write(template_dir.join("README.md"), "hello\n").unwrap();
    run(std::process::Command::new("git").args(["add", "-A"]).current_dir(&template_dir));
    run(std::process::Command::new("git").args(["commit", "-q", "-m", "initial"]).current_dir(&template_dir));
    run(std::process::Command::new("git").args(["update-ref", "refs/remotes/origin/master", "HEAD"]).current_dir(&template_dir));

    let apply_script_path = root.path().join("apply-one-patch.sh");
    std::fs::write(
        &apply_script_path,
        "#!/bin/sh\nset -e\npatch_file=\"$1\"\nrepo_dir=\"$2\"\nwork_dir=\"$(pwd)\"\ncd \"$repo_dir\"\ngit apply \"$work_dir/$patch_file\"\ngit add -A\ngit commit -q -m \"apply $patch_file\"\n",
    )
    .unwrap();
    make_executable(&apply_script_path);

    let stub_bin_dir = root.path().join("bin");
    std::fs::create_dir_all(&stub_bin_dir).unwrap();
    let meson_stub = stub_bin_dir.join("meson");
    std::fs::write(
        &meson_stub,
        "#!/bin/sh\ncase \"$1\" in\n  setup) mkdir -p \"$2\"; exit 0 ;;\n  test) exit 0 ;;\n  *) exit 1 ;;\nesac\n",
    )
    .unwrap();
    make_executable(&meson_stub);
    let ninja_stub = stub_bin_dir.join("ninja");
    std::fs::write(&ninja_stub, "#!/bin/sh\nexit 0\n").unwrap();
    make_executable(&ninja_stub);

    let attachment_port = spawn_attachment_server(PATCH_BODY.as_bytes().to_vec());

    PipelineFixture { _root: root, template_dir, apply_script_path, stub_bin_dir, attachment_port }
}

impl PipelineFixture {
    fn path_env(&self) -> String {
        format!("{}:{}", self.stub_bin_dir.display(), std::env::var("PATH").unwrap_or_default())
    }

    fn file_fetch_url_base(&self) -> String {
        format!("http://127.0.0.1:{}/", self.attachment_port)
    }

    fn overrides(&self) -> Vec<(&'static str, String)> {
        vec![
            ("CFBOTD_TEMPLATE_DIR", self.template_dir.display().to_string()),
            ("CFBOTD_APPLY_SCRIPT_PATH", self.apply_script_path.display().to_string()),
            ("FILE_FETCH_URL_BASE", self.file_fetch_url_base()),
            ("PATH", self.path_env()),
        ]
    }

    fn attachments_dir(&self, daemon: &Daemon) -> PathBuf {
        daemon._root.path().join("attachments")
    }

    fn write_manifest(&self, daemon: &Daemon, patch_id: i64) {
        let manifest = serde_json::json!([{
            "attachment_id": patch_id,
            "filename": format!("v1-{patch_id}.patch"),
            "is_patch": true,
        }]);
        std::fs::write(
            self.attachments_dir(daemon).join(format!("{patch_id}.json")),
            serde_json::to_vec(&manifest).unwrap(),
        )
        .unwrap();
    }
}

/// A bare-bones HTTP/1.1 server that ignores the request entirely and
/// always answers with `body` — good enough to stand in for the
/// attachment-download collaborator (§6's `FILE_FETCH_URL_BASE`).
fn spawn_attachment_server(body: Vec<u8>) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let mut buf = [0u8; 8192];
            let _ = stream.read(&mut buf);
            let header = format!("HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n", body.len());
            let _ = stream.write_all(header.as_bytes());
            let _ = stream.write_all(&body);
            let _ = stream.flush();
        }
    });
    port
}

#[test]
fn single_patch_happy_path_reaches_finished() {
    let fixture = build_pipeline_fixture();
    let daemon = spawn_daemon(&fixture.overrides());
    fixture.write_manifest(&daemon, 101);

    enqueue(&daemon.socket_path, 101, "msg-a");
    let (returned, new_current) = do_move(&daemon.socket_path);
    assert_eq!(returned["patch_id"], 101);
    assert_eq!(new_current["patch_id"], 101, "a ring of one wraps back to itself");

    let branch_id = branch_id_for_patch(&daemon.socket_path, 101);
    let statuses = drive_to_terminal(&daemon.socket_path, &branch_id);
    assert_eq!(statuses.last().map(String::as_str), Some("finished"));

    for expected in ["applying", "applied", "compiling", "compiled", "testing", "tested", "finished"] {
        assert!(statuses.contains(&expected.to_string()), "expected {expected} among {statuses:?}");
    }

    let history = history_statuses(&daemon.socket_path, &branch_id);
    assert_eq!(history.len(), statuses.len(), "one history row per step call");
    assert_eq!(history.first().map(String::as_str), Some("finished"), "history is reverse-chronological");

    let queue_item = cfbot_json(&daemon.socket_path, &["peek"]);
    assert!(queue_item["last_base_commit"].is_string(), "apply stage should have captured a base commit sha");
}

#[test]
fn patch_set_replacement_keeps_one_item_with_latest_message_id() {
    let daemon = spawn_daemon(&[]);

    enqueue(&daemon.socket_path, 5, "m1");
    enqueue(&daemon.socket_path, 7, "m2");
    enqueue(&daemon.socket_path, 5, "m3");

    let queue = cfbot_json(&daemon.socket_path, &["queue"]).as_array().expect("queue is an array").clone();
    assert_eq!(queue.len(), 2, "patch 5 should have been replaced in place, not duplicated");

    let patch_5 = queue.iter().find(|item| item["patch_id"] == 5).expect("patch 5 still present");
    assert_eq!(patch_5["message_id"], "m3");
}

#[test]
fn apply_aborted_when_template_dir_is_missing() {
    let daemon = spawn_daemon(&[]);

    enqueue(&daemon.socket_path, 202, "msg-b");
    do_move(&daemon.socket_path);
    let branch_id = branch_id_for_patch(&daemon.socket_path, 202);

    let status = process_branch(&daemon.socket_path, &branch_id);
    assert_eq!(status, "applying-aborted");

    let tasks = cfbot_json(&daemon.socket_path, &["tasks", "--branch-id", &branch_id]);
    assert_eq!(tasks.as_array().unwrap().len(), 0, "no Download Task should be created when begin aborts");
}

#[test]
fn two_branches_progress_independently() {
    let fixture = build_pipeline_fixture();
    let daemon = spawn_daemon(&fixture.overrides());
    fixture.write_manifest(&daemon, 11);
    fixture.write_manifest(&daemon, 12);

    enqueue(&daemon.socket_path, 11, "msg-11");
    enqueue(&daemon.socket_path, 12, "msg-12");
    do_move(&daemon.socket_path);
    do_move(&daemon.socket_path);

    let branch_a = branch_id_for_patch(&daemon.socket_path, 11);
    let branch_b = branch_id_for_patch(&daemon.socket_path, 12);
    assert_ne!(branch_a, branch_b);

    let statuses_a = drive_to_terminal(&daemon.socket_path, &branch_a);
    let statuses_b = drive_to_terminal(&daemon.socket_path, &branch_b);
    assert_eq!(statuses_a.last().map(String::as_str), Some("finished"));
    assert_eq!(statuses_b.last().map(String::as_str), Some("finished"));

    let history_a = cfbot_json(&daemon.socket_path, &["history", "--branch-id", &branch_a]);
    for row in history_a.as_array().unwrap() {
        assert_eq!(row["patch_id"], 11, "branch A's history must never mention branch B's patch");
    }
    let history_b = cfbot_json(&daemon.socket_path, &["history", "--branch-id", &branch_b]);
    for row in history_b.as_array().unwrap() {
        assert_eq!(row["patch_id"], 12, "branch B's history must never mention branch A's patch");
    }
}
