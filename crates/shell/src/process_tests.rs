use super::*;
use std::time::Duration;

#[tokio::test]
async fn captures_stdout_on_success() {
    let out = Cmd::new("sh").arg("-c").arg("echo hello").run().await.unwrap();
    assert!(out.success);
    assert_eq!(out.code, Some(0));
    assert_eq!(out.stdout.trim(), "hello");
}

#[tokio::test]
async fn captures_nonzero_exit_and_stderr() {
    let out = Cmd::new("sh").arg("-c").arg("echo oops 1>&2; exit 3").run().await.unwrap();
    assert!(!out.success);
    assert_eq!(out.code, Some(3));
    assert_eq!(out.stderr.trim(), "oops");
}

#[tokio::test]
async fn runs_in_given_cwd() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("marker.txt"), b"x").unwrap();
    let out = Cmd::new("ls").cwd(dir.path()).run().await.unwrap();
    assert!(out.stdout.contains("marker.txt"));
}

#[tokio::test]
async fn times_out_long_running_command() {
    let result = Cmd::new("sleep").arg("5").timeout(Duration::from_millis(50)).run().await;
    assert!(matches!(result, Err(ShellError::Timeout { .. })));
}

#[tokio::test]
async fn spawn_error_on_missing_program() {
    let result = Cmd::new("definitely-not-a-real-binary-xyz").run().await;
    assert!(matches!(result, Err(ShellError::Spawn { .. })));
}
