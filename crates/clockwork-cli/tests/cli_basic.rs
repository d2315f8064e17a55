//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary HOME, so the
//! config file and database start empty.

use std::io::Write;
use std::process::{Command, Stdio};

use tempfile::TempDir;

fn clockwork(home: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_clockwork"));
    cmd.env("HOME", home.path())
        .env_remove("CLOCKWORK_ENV")
        .env_remove("RUST_LOG");
    cmd
}

/// Run a CLI command and return (code, stdout, stderr).
fn run_cli(home: &TempDir, args: &[&str]) -> (i32, String, String) {
    let output = clockwork(home)
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn alarms_json(home: &TempDir) -> Vec<serde_json::Value> {
    let (code, stdout, _) = run_cli(home, &["alarm", "list", "--json"]);
    assert_eq!(code, 0);
    serde_json::from_str(&stdout).expect("alarm list is not JSON")
}

#[test]
fn test_alarm_add_list_delete() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&home, &["alarm", "add", "9:30", "--label", "Standup"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("09:30 Standup"));

    run_cli(&home, &["alarm", "add", "21:00"]);
    let alarms = alarms_json(&home);
    assert_eq!(alarms.len(), 2);
    assert_eq!(alarms[0]["time"], "09:30");
    assert_eq!(alarms[1]["label"], "Unnamed Alarm");
    assert_eq!(alarms[1]["triggered"], false);

    let id = alarms[0]["id"].as_u64().unwrap().to_string();
    let (code, _, _) = run_cli(&home, &["alarm", "delete", &id]);
    assert_eq!(code, 0);
    assert_eq!(alarms_json(&home).len(), 1);

    let before = alarms_json(&home);
    let (code, stdout, _) = run_cli(&home, &["alarm", "delete", &id]);
    assert_eq!(code, 0);
    assert!(stdout.contains("no change"));
    assert_eq!(alarms_json(&home), before);
}

#[test]
fn test_alarm_edit_unknown_id_is_no_op() {
    let home = TempDir::new().unwrap();
    run_cli(&home, &["alarm", "add", "06:45", "--label", "Run"]);
    let before = alarms_json(&home);

    let (code, stdout, _) = run_cli(&home, &["alarm", "edit", "1", "08:00"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("no change"));
    assert_eq!(alarms_json(&home), before);
}

#[test]
fn test_alarm_edit_keeps_label() {
    let home = TempDir::new().unwrap();
    run_cli(&home, &["alarm", "add", "06:45", "--label", "Run"]);
    let id = alarms_json(&home)[0]["id"].as_u64().unwrap().to_string();

    let (code, _, _) = run_cli(&home, &["alarm", "edit", &id, "07:00"]);
    assert_eq!(code, 0);
    let alarms = alarms_json(&home);
    assert_eq!(alarms[0]["time"], "07:00");
    assert_eq!(alarms[0]["label"], "Run");
}

#[test]
fn test_alarm_rejects_bad_time() {
    let home = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(&home, &["alarm", "add", "24:00"]);
    assert_eq!(code, 1);
    assert!(stderr.starts_with("error:"));
    assert!(alarms_json(&home).is_empty());
}

#[test]
fn test_alarm_clear_requires_yes() {
    let home = TempDir::new().unwrap();
    run_cli(&home, &["alarm", "add", "10:00"]);
    run_cli(&home, &["alarm", "add", "11:00"]);

    let (code, _, _) = run_cli(&home, &["alarm", "clear"]);
    assert_eq!(code, 1);
    assert_eq!(alarms_json(&home).len(), 2);

    let (code, stdout, _) = run_cli(&home, &["alarm", "clear", "--yes"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("2 alarm(s) cleared"));
    assert!(alarms_json(&home).is_empty());
}

#[test]
fn test_label_duplicates_rejected() {
    let home = TempDir::new().unwrap();
    assert_eq!(run_cli(&home, &["label", "add", "Tea"]).0, 0);
    let (code, _, stderr) = run_cli(&home, &["label", "add", " Tea "]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Tea"));

    assert_eq!(run_cli(&home, &["label", "rename", "Tea", "Coffee"]).0, 0);
    let (_, stdout, _) = run_cli(&home, &["label", "list", "--json"]);
    let labels: Vec<String> = serde_json::from_str(&stdout).unwrap();
    assert_eq!(labels, vec!["Coffee".to_string()]);
}

#[test]
fn test_theme_toggle_persists() {
    let home = TempDir::new().unwrap();
    assert_eq!(run_cli(&home, &["theme", "get"]).1.trim(), "light");
    assert_eq!(run_cli(&home, &["theme", "toggle"]).1.trim(), "dark");
    assert_eq!(run_cli(&home, &["theme", "get"]).1.trim(), "dark");
    assert_eq!(run_cli(&home, &["theme", "set", "purple"]).0, 1);
}

#[test]
fn test_config_get_set() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&home, &["config", "get", "countdown.default_duration_secs"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "60");

    let (code, _, _) = run_cli(&home, &["config", "set", "countdown.default_duration_secs", "5"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(&home, &["config", "get", "countdown.default_duration_secs"]);
    assert_eq!(stdout.trim(), "5");

    assert_eq!(run_cli(&home, &["config", "get", "no.such.key"]).0, 1);
}

#[test]
fn test_config_empty_value_clears_sound_file() {
    let home = TempDir::new().unwrap();
    let (code, _, _) = run_cli(&home, &["config", "set", "notifications.sound_file", ""]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(&home, &["config", "get", "notifications.sound_file"]);
    assert_eq!(stdout.trim(), "");
}

#[test]
fn test_stopwatch_status_json() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&home, &["stopwatch", "status", "--json"]);
    assert_eq!(code, 0);
    let status: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(status["elapsed_ms"], 0);
    assert_eq!(status["running"], false);
    assert_eq!(status["display"], "00:00:00");

    run_cli(&home, &["stopwatch", "start"]);
    let (_, stdout, _) = run_cli(&home, &["stopwatch", "status", "--json"]);
    let status: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(status["running"], true);
}

#[test]
fn test_stopwatch_help_points_to_live_timing() {
    let home = TempDir::new().unwrap();
    // Help text wraps with the terminal width.
    let flat = |s: String| s.split_whitespace().collect::<Vec<_>>().join(" ");

    let (code, stdout, _) = run_cli(&home, &["stopwatch", "--help"]);
    assert_eq!(code, 0);
    let help = flat(stdout);
    assert!(help.contains("not counted"));
    assert!(help.contains("`stopwatch watch`"));
    assert!(help.contains("`clockwork shell`"));

    let (_, stdout, _) = run_cli(&home, &["stopwatch", "start", "--help"]);
    assert!(flat(stdout).contains("`stopwatch watch`"));
}

#[test]
fn test_countdown_runs_to_completion() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&home, &["countdown", "run", "--seconds", "1"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("00:01"));
    assert!(stdout.contains("countdown finished"));
}

#[test]
fn test_countdown_unknown_label() {
    let home = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(&home, &["countdown", "run", "--label", "Pasta"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown label"));
}

#[test]
fn test_shell_routes_by_view() {
    let home = TempDir::new().unwrap();
    let mut child = clockwork(&home)
        .arg("shell")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"view stopwatch\nstart\nlap\nview alarm\nadd 08:15 Bus\nquit\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("stopwatch started"));
    assert!(stdout.contains("lap 1:"));
    assert!(stdout.contains("08:15 Bus"));
    assert_eq!(alarms_json(&home).len(), 1);
}

#[test]
fn test_completions() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&home, &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("clockwork"));
}
