#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::process::Command;

pub async fn run_cmdrun(args: &[&str]) -> Output {
    run_cmdrun_with_env(args, &[]).await
}

pub async fn run_cmdrun_with_env(args: &[&str], envs: &[(&str, &str)]) -> Output {
    let exe = cmdrun_exe_path();

    let mut cmd = Command::new(exe);
    cmd.args(args)
        .env_remove("CMDRUN_LOG_LEVEL")
        .env_remove("RUST_LOG")
        .envs(envs.iter().copied())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    tokio::time::timeout(Duration::from_secs(10), cmd.output())
        .await
        .expect("timed out waiting for cmdrun")
        .expect("failed to run cmdrun")
}

fn cmdrun_exe_path() -> PathBuf {
    if let Ok(exe) = std::env::var("CARGO_BIN_EXE_cmdrun") {
        return PathBuf::from(exe);
    }

    let current = std::env::current_exe().expect("failed to read current test binary path");
    let target_dir = current
        .parent()
        .and_then(|path| path.parent())
        .expect("failed to derive target/debug directory from test binary path");
    let fallback = target_dir.join(format!("cmdrun{}", std::env::consts::EXE_SUFFIX));
    assert!(
        fallback.exists(),
        "cmdrun binary not found at {}",
        fallback.display()
    );
    fallback
}

pub fn temp_path(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!("cmdrun-it-{label}-{}", uuid::Uuid::new_v4()))
}

pub fn stdout_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
