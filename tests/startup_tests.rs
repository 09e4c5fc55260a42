//! Tests for main.rs startup validation and the one-shot CLI helpers.

use std::fs;
use std::process::{Command, Output, Stdio};

const SECRET: &str = "startup-test-secret-that-is-long-enough";

fn run(args: &[&str], secret: Option<&str>) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_tollgate"));
    match secret {
        Some(secret) => command.env("JWT_SECRET", secret),
        None => command.env_remove("JWT_SECRET"),
    };
    command
        .args(args)
        .stderr(Stdio::piped())
        .stdout(Stdio::piped())
        .output()
        .expect("Failed to run binary")
}

fn combined(output: &Output) -> String {
    // tracing logs to stdout by default
    format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

fn temp_db(name: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("tollgate-{}-{}.db", name, std::process::id()));
    let _ = fs::remove_file(&path);
    path
}

#[test]
fn test_missing_jwt_secret_exits_with_error() {
    let output = run(&[], None);

    assert!(
        !output.status.success(),
        "Should exit with error when JWT_SECRET is missing"
    );
    let text = combined(&output);
    assert!(
        text.contains("JWT_SECRET") && text.contains("required"),
        "Should mention JWT_SECRET is required, got: {}",
        text
    );
}

#[test]
fn test_short_jwt_secret_exits_with_error() {
    let output = run(&[], Some("too-short"));

    assert!(!output.status.success());
    assert!(combined(&output).contains("shorter than 32"));
}

#[test]
fn test_issue_tokens_for_unknown_user_fails() {
    let db = temp_db("unknown");
    let output = run(
        &[
            "--database",
            db.to_str().unwrap(),
            "--issue-tokens",
            "nobody@example.com",
        ],
        Some(SECRET),
    );

    assert!(!output.status.success());
    assert!(combined(&output).contains("No such user"));
    let _ = fs::remove_file(&db);
}

#[test]
fn test_create_admin_then_issue_tokens() {
    let db = temp_db("issue");
    let output = run(
        &[
            "--database",
            db.to_str().unwrap(),
            "--create-admin",
            "root@example.com",
            "--issue-tokens",
            "root@example.com",
        ],
        Some(SECRET),
    );

    assert!(output.status.success(), "got: {}", combined(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Admin user created: root@example.com"));
    assert!(stdout.contains("Access token:  Bearer "));
    assert!(stdout.contains("Refresh token: "));
    let _ = fs::remove_file(&db);
}
