//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against an isolated data directory and
//! verify outputs.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(dir: &Path, args: &[&str]) -> (String, String, i32) {
    run_cli_with_input(dir, args, "")
}

fn run_cli_with_input(dir: &Path, args: &[&str], input: &str) -> (String, String, i32) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_smoketrack"))
        .args(args)
        .env("SMOKETRACK_DATA_DIR", dir)
        .env_remove("SMOKETRACK_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute CLI command");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input.as_bytes())
        .expect("Failed to write stdin");
    let output = child.wait_with_output().expect("Failed to wait for CLI");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(dir: &Path, args: &[&str]) -> serde_json::Value {
    let mut full = args.to_vec();
    full.push("--json");
    let (stdout, stderr, code) = run_cli(dir, &full);
    assert_eq!(code, 0, "CLI command failed: {args:?}: {stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

#[test]
fn test_status_on_fresh_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["status"]);
    assert_eq!(code, 0, "status failed");
    assert!(stdout.contains("Recorded:          0"));

    let json = run_json(dir.path(), &["status"]);
    assert_eq!(json["count"], 0);
    assert_eq!(json["avg_minutes_text"], "—");
}

#[test]
fn test_smoke_then_status() {
    let dir = tempfile::tempdir().unwrap();
    let event = run_json(dir.path(), &["smoke", "8"]);
    assert_eq!(event["type"], "SmokeRecorded");
    assert_eq!(event["intensity"], 8);
    assert_eq!(event["count"], 1);

    let (_, _, code) = run_cli(dir.path(), &["smoke", "5"]);
    assert_eq!(code, 0);

    let status = run_json(dir.path(), &["status"]);
    assert_eq!(status["count"], 2);
    assert_eq!(status["avg_puffs_text"], "6.5");
}

#[test]
fn test_smoke_rejects_negative_puffs() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["smoke", "--", "-3"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"), "stderr: {stderr}");

    let status = run_json(dir.path(), &["status"]);
    assert_eq!(status["count"], 0);
}

#[test]
fn test_smoke_prompt_uses_default_and_cancels_on_eof() {
    let dir = tempfile::tempdir().unwrap();

    let (stdout, _, code) = run_cli_with_input(dir.path(), &["smoke"], "");
    assert_eq!(code, 0);
    assert!(stdout.is_empty());
    assert_eq!(run_json(dir.path(), &["status"])["count"], 0);

    let (_, _, code) = run_cli_with_input(dir.path(), &["smoke"], "\n");
    assert_eq!(code, 0);
    let status = run_json(dir.path(), &["status"]);
    assert_eq!(status["count"], 1);
    assert_eq!(status["avg_puffs_text"], "8.0");
}

#[test]
fn test_targets_and_advice() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["advise"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("No minutes target set"));

    let saved = run_json(dir.path(), &["targets", "set", "--minutes", "60", "--puffs", "6"]);
    assert_eq!(saved["type"], "TargetsSaved");
    assert_eq!(saved["target_minutes"], 60);

    run_cli(dir.path(), &["smoke", "8"]);
    let advice = run_json(dir.path(), &["advise"]);
    let wait = advice["wait_minutes"].as_u64().unwrap();
    assert!((119..=120).contains(&wait), "wait was {wait}");
    assert_eq!(advice["next_puffs"], 4);

    // An omitted flag keeps the current value; an empty one clears it.
    run_cli(dir.path(), &["targets", "set", "--puffs", ""]);
    let targets = run_json(dir.path(), &["targets", "show"]);
    assert_eq!(targets["target_minutes"], 60);
    assert!(targets["target_puffs"].is_null());
}

#[test]
fn test_run_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["run", "stop"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("No active run"));

    assert_eq!(run_json(dir.path(), &["run", "start"])["type"], "RunStarted");
    assert_eq!(run_json(dir.path(), &["run", "start"])["type"], "RunAlreadyActive");
    assert_eq!(run_json(dir.path(), &["run", "stop"])["type"], "RunStopped");

    let status = run_json(dir.path(), &["run", "status"]);
    assert_eq!(status["active"], false);
    assert_eq!(status["total"], 1);
    assert_eq!(status["this_week"], 1);
}

#[test]
fn test_reset_requires_confirmation() {
    let dir = tempfile::tempdir().unwrap();
    run_cli(dir.path(), &["targets", "set", "--minutes", "30"]);
    run_cli(dir.path(), &["smoke", "4"]);

    let (_, stderr, code) = run_cli_with_input(dir.path(), &["reset"], "n\n");
    assert_eq!(code, 0);
    assert!(stderr.contains("cancelled"));
    assert_eq!(run_json(dir.path(), &["status"])["count"], 1);

    let event = run_json(dir.path(), &["reset", "--yes"]);
    assert_eq!(event["type"], "StateReset");
    let status = run_json(dir.path(), &["status"]);
    assert_eq!(status["count"], 0);
    assert_eq!(status["target_minutes"], 30);
}

#[test]
fn test_state_import_legacy_export() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("legacy.json");
    std::fs::write(
        &file,
        r#"{"targetMinutes":45,"targetPuffs":7,"count":3,"minutesSum":90,"puffsSum":21,"lastSmokeAt":1700000000000}"#,
    )
    .unwrap();

    let (stdout, stderr, code) = run_cli(dir.path(), &["state", "import", file.to_str().unwrap()]);
    assert_eq!(code, 0, "import failed: {stderr}");
    assert!(stdout.contains("imported 3 cigarettes"));

    let (stdout, _, code) = run_cli(dir.path(), &["state", "export"]);
    assert_eq!(code, 0);
    let exported: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(exported["version"], 3);
    assert_eq!(exported["smokeLog"].as_array().unwrap().len(), 3);
    assert_eq!(exported["targetMinutes"], 45);
}

#[test]
fn test_config_commands() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "stats.cycle_start_hour"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "8");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "ui.locale", "he"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "ui.locale"]);
    assert_eq!(stdout.trim(), "he");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "stats.cycle_start_hour", "25"]);
    assert_eq!(code, 1);
    let (_, _, code) = run_cli(dir.path(), &["config", "get", "ui.nope"]);
    assert_eq!(code, 1);

    let (stdout, _, code) = run_cli(dir.path(), &["config", "list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("taper_large_waits"));
}

#[test]
fn test_watch_stops_after_count() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["watch", "--count", "1", "--json"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.lines().count(), 1);
}

#[test]
fn test_completions() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("smoketrack"));
}
