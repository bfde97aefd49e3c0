#![cfg(unix)]

mod common;

use common::{run_cmdrun, run_cmdrun_with_env, stderr_text, stdout_text, temp_path};

#[tokio::test]
async fn cli_prints_child_stdout_verbatim() {
    let output = run_cmdrun(&["sh", "--", "-c", "printf report-data"]).await;
    assert!(output.status.success(), "stderr: {}", stderr_text(&output));
    assert_eq!(stdout_text(&output), "report-data");
}

#[tokio::test]
async fn cli_prints_true_for_empty_output() {
    let output = run_cmdrun(&["true"]).await;
    assert!(output.status.success(), "stderr: {}", stderr_text(&output));
    assert_eq!(stdout_text(&output), "true\n");
}

#[tokio::test]
async fn cli_pipes_literal_input_to_child() {
    let output = run_cmdrun(&["cat", "--input", "literal payload"]).await;
    assert!(output.status.success(), "stderr: {}", stderr_text(&output));
    assert_eq!(stdout_text(&output), "literal payload");
}

#[tokio::test]
async fn cli_passes_file_input_as_argument() {
    let path = temp_path("file");
    std::fs::write(&path, "line one\nline two\n").expect("write temp file");
    let raw = path.to_str().expect("utf-8 temp path").to_string();

    let output = run_cmdrun(&["wc", "--input", &raw, "--args", "-l"]).await;
    std::fs::remove_file(&path).ok();

    assert!(output.status.success(), "stderr: {}", stderr_text(&output));
    let text = stdout_text(&output);
    assert!(text.trim_start().starts_with('2'), "unexpected output: {text}");
    assert!(text.contains(&raw), "unexpected output: {text}");
}

#[tokio::test]
async fn cli_reports_child_stderr_as_failure() {
    let output = run_cmdrun(&["sh", "--", "-c", "printf ok; printf 'bad input' >&2; sleep 0.2"]).await;
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout_text(&output), "");
    assert_eq!(stderr_text(&output).trim_end(), "[cmdrun] Error: bad input");
}

#[tokio::test]
async fn cli_reports_spawn_failure() {
    let output = run_cmdrun(&["cmdrun-definitely-missing-executable"]).await;
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_text(&output)
        .contains("Failed to spawn 'cmdrun-definitely-missing-executable'"));
}

#[tokio::test]
async fn cli_json_renders_success_and_failure() {
    let output = run_cmdrun(&["--json", "true"]).await;
    assert!(output.status.success(), "stderr: {}", stderr_text(&output));
    let payload: serde_json::Value =
        serde_json::from_str(stdout_text(&output).trim()).expect("stdout was not valid JSON");
    assert_eq!(payload, serde_json::json!({"ok": true, "success": true}));

    let output = run_cmdrun(&["--json", "sh", "--", "-c", "printf boom >&2; sleep 0.2"]).await;
    assert_eq!(output.status.code(), Some(1));
    let payload: serde_json::Value =
        serde_json::from_str(stdout_text(&output).trim()).expect("stdout was not valid JSON");
    assert_eq!(payload, serde_json::json!({"ok": false, "error": "boom"}));
}

#[tokio::test]
async fn cli_strict_exit_fails_on_nonzero_status() {
    let lenient = run_cmdrun(&["sh", "--", "-c", "exit 4"]).await;
    assert!(lenient.status.success(), "stderr: {}", stderr_text(&lenient));
    assert_eq!(stdout_text(&lenient), "true\n");

    let strict = run_cmdrun(&["--strictExit", "sh", "--", "-c", "exit 4"]).await;
    assert_eq!(strict.status.code(), Some(1));
    assert!(stderr_text(&strict).contains("Process exited with status 4"));
}

#[tokio::test]
async fn cli_forwards_env_values() {
    let output = run_cmdrun(&[
        "sh",
        "--env",
        "CMDRUN_IT_VALUE=hello",
        "--",
        "-c",
        "printf \"$CMDRUN_IT_VALUE\"",
    ])
    .await;
    assert!(output.status.success(), "stderr: {}", stderr_text(&output));
    assert_eq!(stdout_text(&output), "hello");
}

#[tokio::test]
async fn cli_rust_log_enables_logs_without_log_level() {
    let quiet = run_cmdrun(&["true"]).await;
    assert!(quiet.status.success(), "stderr: {}", stderr_text(&quiet));
    assert_eq!(stderr_text(&quiet), "");

    let verbose = run_cmdrun_with_env(&["true"], &[("RUST_LOG", "cmdrun=debug")]).await;
    assert!(verbose.status.success(), "stderr: {}", stderr_text(&verbose));
    assert_eq!(stdout_text(&verbose), "true\n");
    assert!(
        stderr_text(&verbose).contains("spawning child process"),
        "unexpected stderr: {}",
        stderr_text(&verbose)
    );
}
