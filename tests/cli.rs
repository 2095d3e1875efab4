//! CLI Tests
//!
//! Drives the `conftree` binary against the scenario fixtures. HOME and the
//! working directory point at an empty temp dir so no stray settings apply.

mod fixtures;

use std::process::{Command, Output};
use tempfile::TempDir;

fn conftree(args: &[&str]) -> (Output, TempDir) {
    let home = TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_conftree"))
        .args(args)
        .env("HOME", home.path())
        .env_remove("RUST_LOG")
        .current_dir(home.path())
        .output()
        .unwrap();
    (output, home)
}

#[test]
fn test_run_prints_json_report() {
    let path = fixtures::scenario_path("split_screen");
    let (output, _home) = conftree(&["run", path.to_str().unwrap(), "--level", "all"]);

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["scenario"], "split screen");
    assert_eq!(report["snapshot"]["level"], "all");
    assert_eq!(report["steps"].as_array().unwrap().len(), 4);
    assert!(report["events"].as_array().is_some());
}

#[test]
fn test_run_human_output() {
    let path = fixtures::scenario_path("home_stack");
    let (output, _home) = conftree(&["run", path.to_str().unwrap(), "--human", "--no-events"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Scenario: home and pinned"));
    assert!(stdout.contains("Tree:\ndisplay type=undefined"));
    assert!(!stdout.contains("Listener events"));
}

#[test]
fn test_verify_reports_counts() {
    let path = fixtures::scenario_path("reparent");
    let (output, _home) = conftree(&["verify", path.to_str().unwrap()]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Nodes: 4"));
    assert!(stdout.contains("Roots: 2"));
    assert!(stdout.contains("Steps: 3"));
}

#[test]
fn test_missing_scenario_exits_2() {
    let (output, _home) = conftree(&["run", "/nonexistent/scenario.toml"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_settings_reflect_project_file() {
    let home = TempDir::new().unwrap();
    std::fs::write(home.path().join("conftree.toml"), "[output]\nformat = \"human\"\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_conftree"))
        .arg("settings")
        .env("HOME", home.path())
        .current_dir(home.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let settings: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(settings["schema_id"], "conftree/effective_settings@1");
    assert_eq!(settings["config"]["output"]["format"], "human");
    assert_eq!(settings["sources"][1]["origin"], "project");
}
