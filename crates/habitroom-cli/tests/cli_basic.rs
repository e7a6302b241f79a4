//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data directory
//! and checks the JSON it prints.

use std::path::Path;
use std::process::Command;

use serde_json::Value;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(data_dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_habitroom-cli"))
        .args(args)
        .env("HABITROOM_DATA_DIR", data_dir)
        .env_remove("HABITROOM_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

/// Run a command that must succeed and parse its stdout as JSON.
fn run_json(data_dir: &Path, args: &[&str]) -> Value {
    let (code, stdout, stderr) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

fn add_habit(data_dir: &Path, args: &[&str]) -> String {
    let mut full = vec!["habit", "add"];
    full.extend_from_slice(args);
    let habit = run_json(data_dir, &full);
    habit["id"].as_str().unwrap().to_string()
}

#[test]
fn test_habit_add_and_list() {
    let dir = tempfile::tempdir().unwrap();
    let id = add_habit(dir.path(), &["Stretch", "--days", "1,3,5"]);

    let list = run_json(dir.path(), &["habit", "list"]);
    let habits = list.as_array().unwrap();
    assert_eq!(habits.len(), 1);
    assert_eq!(habits[0]["id"], id.as_str());
    assert_eq!(habits[0]["habit_type"], "boolean");
    assert_eq!(habits[0]["scheduled_days"], serde_json::json!([1, 3, 5]));
}

#[test]
fn test_done_toggles() {
    let dir = tempfile::tempdir().unwrap();
    let id = add_habit(dir.path(), &["Stretch"]);

    let first = run_json(dir.path(), &["done", &id, "--date", "2024-06-03"]);
    assert_eq!(first["completed"], true);
    let second = run_json(dir.path(), &["done", &id, "--date", "2024-06-03"]);
    assert_eq!(second["completed"], false);
    assert_eq!(second["value"], 0);
}

#[test]
fn test_count_accepts_negative_delta() {
    let dir = tempfile::tempdir().unwrap();
    let id = add_habit(dir.path(), &["Pushups", "--type", "count", "--target", "2"]);

    run_json(dir.path(), &["count", &id, "3"]);
    let after = run_json(dir.path(), &["count", &id, "-5"]);
    assert_eq!(after["value"], 0);
    assert_eq!(after["completed"], false);
}

#[test]
fn test_time_set_and_stats() {
    let dir = tempfile::tempdir().unwrap();
    let id = add_habit(dir.path(), &["Piano", "--type", "time", "--target", "1"]);

    let completion = run_json(dir.path(), &["time", "set", &id, "90"]);
    assert_eq!(completion["completed"], true);

    let stats = run_json(dir.path(), &["stats", "show", &id]);
    assert_eq!(stats["total_time"], 90);
    assert!(stats.get("total_count").is_none());
    assert_eq!(stats["completed_today"], true);
}

#[test]
fn test_timer_status_absent_and_stop_without_timer() {
    let dir = tempfile::tempdir().unwrap();
    let id = add_habit(dir.path(), &["Piano", "--type", "time"]);

    let status = run_json(dir.path(), &["timer", "status", &id]);
    assert_eq!(status["state"], "absent");

    let (code, _, stderr) = run_cli(dir.path(), &["timer", "stop", &id]);
    assert_eq!(code, 1);
    assert!(stderr.contains("No timer found"), "stderr: {stderr}");
}

#[test]
fn test_timer_start_then_reset() {
    let dir = tempfile::tempdir().unwrap();
    let id = add_habit(dir.path(), &["Piano", "--type", "time"]);

    let started = run_json(dir.path(), &["timer", "start", &id]);
    assert_eq!(started["state"], "running");
    let paused = run_json(dir.path(), &["timer", "pause", &id]);
    assert_eq!(paused["state"], "paused");

    let (code, _, _) = run_cli(dir.path(), &["timer", "reset", &id]);
    assert_eq!(code, 0);
    let status = run_json(dir.path(), &["timer", "status", &id]);
    assert_eq!(status["state"], "absent");
}

#[test]
fn test_wrong_type_and_unknown_habit_fail() {
    let dir = tempfile::tempdir().unwrap();
    let id = add_habit(dir.path(), &["Stretch"]);

    let (code, _, stderr) = run_cli(dir.path(), &["count", &id, "1"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("requires a count habit"), "stderr: {stderr}");

    let (code, _, stderr) = run_cli(dir.path(), &["habit", "show", "missing"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("not found"), "stderr: {stderr}");
}

#[test]
fn test_invalid_schedule_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["habit", "add", "Gym", "--days", "6"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("not a weekday"), "stderr: {stderr}");
    assert_eq!(run_json(dir.path(), &["habit", "list"]), serde_json::json!([]));
}

#[test]
fn test_holiday_import_and_dayoff() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("holidays.json");
    std::fs::write(
        &file,
        r#"[{"date": "2025-01-01", "name": "New Year"}, {"date": "2025-12-25", "name": "Christmas"}]"#,
    )
    .unwrap();

    let imported = run_json(dir.path(), &["holiday", "import", file.to_str().unwrap()]);
    assert_eq!(imported["imported"], 2);
    assert_eq!(run_json(dir.path(), &["holiday", "list"]).as_array().unwrap().len(), 2);

    let (code, _, _) = run_cli(dir.path(), &["dayoff", "add", "2025-03-03", "--reason", "trip"]);
    assert_eq!(code, 0);
    let day_offs = run_json(dir.path(), &["dayoff", "list"]);
    assert_eq!(day_offs[0]["reason"], "trip");

    let (code, _, _) = run_cli(dir.path(), &["dayoff", "add", "03/03/2025"]);
    assert_ne!(code, 0);
}

#[test]
fn test_config_set_changes_account_scope() {
    let dir = tempfile::tempdir().unwrap();
    add_habit(dir.path(), &["Stretch"]);

    let (code, stdout, _) = run_cli(dir.path(), &["config", "set", "account", "other"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok");

    let (_, stdout, _) = run_cli(dir.path(), &["config", "get", "account"]);
    assert_eq!(stdout.trim(), "other");
    assert_eq!(run_json(dir.path(), &["habit", "list"]), serde_json::json!([]));
}

#[test]
fn test_stats_all_and_archive() {
    let dir = tempfile::tempdir().unwrap();
    let keep = add_habit(dir.path(), &["Stretch"]);
    let gone = add_habit(dir.path(), &["Walk"]);
    run_json(dir.path(), &["habit", "archive", &gone]);

    let stats = run_json(dir.path(), &["stats", "all"]);
    let obj = stats.as_object().unwrap();
    assert!(obj.contains_key(&keep));
    assert!(!obj.contains_key(&gone));

    let batch = run_json(dir.path(), &["stats", "batch", &keep, &gone, "missing"]);
    assert_eq!(batch.as_object().unwrap().len(), 2);
}

#[test]
fn test_completions_leave_data_dir_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("fresh");

    let (code, stdout, stderr) = run_cli(&data_dir, &["completions", "bash"]);
    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stdout.contains("habitroom-cli"));
    assert!(stderr.is_empty(), "stderr: {stderr}");
    assert!(!data_dir.exists());
}
