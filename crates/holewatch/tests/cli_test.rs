//! Integration tests for the `holewatch` CLI binary.
//!
//! Every test runs against a throwaway database and catalog in a temp
//! directory, with the connection feed and mirror switched off and the
//! killboard pointed at a closed local port.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

const CATALOG: &str = r#"{
  "systems": [
    { "id": 31000001, "name": "J100001", "class": "C3", "statics": ["D845"] },
    { "id": 31000004, "name": "J123456", "class": "C2", "statics": ["B274"] },
    { "id": 31000005, "name": "J000123", "class": "C13" }
  ],
  "statics": [
    { "code": "D845", "leads_to": "HS", "lifetime_hours": 24 },
    { "code": "B274", "leads_to": "HS" }
  ]
}"#;

// ── Helpers ─────────────────────────────────────────────────────────

fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("catalog.json"), CATALOG).unwrap();
    dir
}

/// Build a [`Command`] isolated from the user's environment and config.
fn holewatch_cmd(dir: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("holewatch");
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir)
        .env("HOLEWATCH_CONFIG", dir.join("missing.toml"))
        .env("HOLEWATCH_DATABASE", dir.join("holewatch.db"))
        .env("HOLEWATCH_CATALOG", dir.join("catalog.json"))
        .env("HOLEWATCH_SCOUT__ENABLED", "false")
        .env("HOLEWATCH_MIRROR__ENABLED", "false")
        .env("HOLEWATCH_KILLBOARD__BASE_URL", "http://127.0.0.1:9")
        .env("HOLEWATCH_KILLBOARD__TIMEOUT_SECS", "2")
        .env_remove("HOLEWATCH_OUTPUT")
        .env_remove("RUST_LOG");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let dir = workspace();
    let output = holewatch_cmd(dir.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_lists_commands() {
    let dir = workspace();
    holewatch_cmd(dir.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("roster")
            .and(predicate::str::contains("groups"))
            .and(predicate::str::contains("run")),
    );
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_show_prints_sections() {
    let dir = workspace();
    holewatch_cmd(dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[monitor]")
                .and(predicate::str::contains("interval_secs = 600")),
        );
}

#[test]
fn test_config_env_override_is_visible() {
    let dir = workspace();
    holewatch_cmd(dir.path())
        .env("HOLEWATCH_MONITOR__INTERVAL_SECS", "60")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("interval_secs = 60"));
}

// ── Roster ──────────────────────────────────────────────────────────

#[test]
fn test_roster_add_then_list() {
    let dir = workspace();
    holewatch_cmd(dir.path())
        .args(["roster", "add", "j123456", "-m", "farm"])
        .assert()
        .success()
        .stderr(predicate::str::contains("J123456 - added to the list"));

    holewatch_cmd(dir.path())
        .args(["-o", "plain", "roster", "list"])
        .assert()
        .success()
        .stdout(predicate::str::diff("J123456\n"));
}

#[test]
fn test_roster_add_unknown_system_fails() {
    let dir = workspace();
    let output = holewatch_cmd(dir.path())
        .args(["roster", "add", "Jita"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("JITA"));
}

#[test]
fn test_roster_add_twice_is_conflict() {
    let dir = workspace();
    holewatch_cmd(dir.path())
        .args(["roster", "add", "J100001"])
        .assert()
        .success();
    holewatch_cmd(dir.path())
        .args(["roster", "add", "J100001"])
        .assert()
        .code(6);
}

#[test]
fn test_roster_remove_missing_is_not_found() {
    let dir = workspace();
    holewatch_cmd(dir.path())
        .args(["roster", "remove", "J100001"])
        .assert()
        .code(4);
}

#[test]
fn test_roster_clear_requires_yes() {
    let dir = workspace();
    holewatch_cmd(dir.path())
        .args(["roster", "clear"])
        .assert()
        .code(2);
    holewatch_cmd(dir.path())
        .args(["--yes", "roster", "clear"])
        .assert()
        .success();
}

// ── Groups and catalog ──────────────────────────────────────────────

#[test]
fn test_groups_add_resolves_members() {
    let dir = workspace();
    holewatch_cmd(dir.path())
        .args(["-o", "plain", "groups", "add", "C3", "HS"])
        .assert()
        .success()
        .stdout(predicate::str::diff("1\n"));

    holewatch_cmd(dir.path())
        .args(["-o", "plain", "groups", "members", "1"])
        .assert()
        .success()
        .stdout(predicate::str::diff("J100001\n"));
}

#[test]
fn test_search_json_output() {
    let dir = workspace();
    let output = holewatch_cmd(dir.path())
        .args(["-o", "json", "search", "HS"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["systems"], serde_json::json!(["J100001", "J123456"]));
}

#[test]
fn test_static_lookup() {
    let dir = workspace();
    holewatch_cmd(dir.path())
        .args(["static", "d845"])
        .assert()
        .success()
        .stdout(predicate::str::contains("*D845* -> HS, lifetime 24h"));
}

#[test]
fn test_missing_catalog_fails() {
    let dir = workspace();
    let output = holewatch_cmd(dir.path())
        .env("HOLEWATCH_CATALOG", dir.path().join("absent.json"))
        .args(["roster", "list"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("absent.json"));
}
