//! Scenario fixtures shared by the integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// Directory holding the scenario TOML fixtures
pub fn scenarios_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/scenarios")
}

/// Path to a named scenario fixture (without the .toml extension)
pub fn scenario_path(name: &str) -> PathBuf {
    scenarios_dir().join(format!("{}.toml", name))
}

/// Every scenario fixture, sorted by file name
pub fn all_scenarios() -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(scenarios_dir())
        .expect("scenario fixture directory")
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    paths.sort();
    paths
}
