//! Shared test utilities for integration tests.
//!
//! Provides helpers for building temporary vaults and conversion
//! configurations used across multiple test files.

use obsigo::Config;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Creates a temporary directory holding a vault and a content root.
///
/// # Returns
///
/// The temp dir plus a configuration pointing `vault` at `<dir>/vault`
/// and `content` at `<dir>/content`, resize and unsafe render off.
pub fn test_setup() -> (TempDir, Config) {
    let dir = TempDir::new().expect("Should create temp directory");

    let config_text = format!(
        "vault = {:?}\nhugo = {:?}\ncontent = \"content\"\n",
        dir.path().join("vault"),
        dir.path(),
    );
    let config_path = dir.path().join("obsigo.toml");
    fs::write(&config_path, config_text).expect("Should write config");

    let config = Config::load(&config_path).expect("Should load config");
    fs::create_dir_all(&config.vault).expect("Should create vault root");

    (dir, config)
}

/// Writes a vault file, creating parent directories as needed.
pub fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Should create parent directories");
    }
    fs::write(path, content).expect("Should write file");
}

/// Reads a converted file from the content root.
pub fn read_output(config: &Config, rel: &str) -> String {
    fs::read_to_string(config.content.join(rel)).expect("Should read converted output")
}

/// Collects every file in a tree as (relative path, bytes), sorted.
///
/// Used for byte-level tree comparison in idempotence tests.
pub fn snapshot_tree(root: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    let mut entries = Vec::new();
    collect(root, root, &mut entries);
    entries.sort();
    entries
}

fn collect(root: &Path, dir: &Path, entries: &mut Vec<(PathBuf, Vec<u8>)>) {
    for entry in fs::read_dir(dir).expect("Should read directory") {
        let entry = entry.expect("Should read entry");
        let path = entry.path();
        if path.is_dir() {
            collect(root, &path, entries);
        } else {
            let rel = path
                .strip_prefix(root)
                .expect("Entry should be under root")
                .to_path_buf();
            let bytes = fs::read(&path).expect("Should read file");
            entries.push((rel, bytes));
        }
    }
}
