#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;

use cmdrun::{classify, run_command, ArgumentSpec, InputKind, Outcome};

#[tokio::test]
async fn url_input_is_prepended_without_touching_stdin() {
    let script = std::env::temp_dir().join(format!("cmdrun-api-url-{}", uuid::Uuid::new_v4()));
    std::fs::write(&script, "#!/bin/sh\nprintf 'first:%s|second:%s|' \"$1\" \"$2\"\ncat\nprintf end\n")
        .expect("write script");
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))
        .expect("make script executable");
    let executable = script.to_str().expect("utf-8 temp path").to_string();

    let outcome = run_command(executable, "ftp://mirror.example.org/pub", "x").await;
    std::fs::remove_file(&script).ok();

    assert_eq!(
        outcome.expect("run should succeed"),
        Outcome::Output("first:ftp://mirror.example.org/pub|second:x|end".into())
    );
}

#[tokio::test]
async fn pre_split_arguments_keep_embedded_spaces() {
    let outcome = run_command("printf", "", vec!["%s|", "two words", "three"])
        .await
        .expect("run should succeed");
    assert_eq!(outcome, Outcome::Output("two words|three|".into()));
}

#[tokio::test]
async fn line_arguments_split_on_spaces() {
    let outcome = run_command("printf", "", "%s| two words")
        .await
        .expect("run should succeed");
    assert_eq!(outcome, Outcome::Output("two|words|".into()));
}

#[tokio::test]
async fn multiline_literal_input_round_trips_through_stdin() {
    let payload = "first line\nsecond line\n";
    assert_eq!(classify(payload).await, InputKind::LiteralData);

    let outcome = run_command("cat", payload, ArgumentSpec::default())
        .await
        .expect("run should succeed");
    assert_eq!(outcome.as_text(), Some(payload));
}
