//! Common test utilities for vsc-sync integration tests.
//!
//! Provides `TestEnv` for isolated test environments that never touch the
//! user's real `config.kdl`, layer repository or editor directories.

#![allow(dead_code)]

use assert_cmd::Command;
use serde_json::Value;
use std::path::{Path, PathBuf};
pub use tempfile::TempDir;

/// A test environment with an isolated home directory.
///
/// Inside the temporary home:
/// - `.config/vsc-sync/config.kdl` is the config file (via `VSC_SYNC_CONFIG`)
/// - `vscode-configs/` is the layer repository
/// - `Code/User/` is the config directory of the `vscode` app
///
/// The `vsc()` method sets the environment per-invocation, making tests
/// parallel-safe.
pub struct TestEnv {
    pub home: TempDir,
}

impl TestEnv {
    /// Create a new test environment with nothing initialized.
    pub fn new() -> Self {
        Self {
            home: TempDir::new().unwrap(),
        }
    }

    /// Create a test environment, run `init` and register the `vscode` app.
    pub fn init() -> Self {
        let env = Self::new();
        env.vsc()
            .arg("init")
            .arg(env.repo_path())
            .arg("--no-discover")
            .assert()
            .success();
        std::fs::create_dir_all(env.user_dir()).unwrap();
        env.vsc()
            .args(["add-app", "vscode"])
            .arg(env.user_dir())
            .assert()
            .success();
        env
    }

    /// Get a Command for the vsc-sync binary with an isolated home and config.
    pub fn vsc(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_vsc-sync"));
        cmd.current_dir(self.home.path());
        cmd.env("HOME", self.home.path());
        cmd.env("VSC_SYNC_CONFIG", self.config_path());
        cmd.env_remove("VSC_SYNC_REPO");
        cmd.env_remove("VSC_SYNC_LOG");
        cmd
    }

    pub fn home_path(&self) -> &Path {
        self.home.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.home.path().join(".config/vsc-sync/config.kdl")
    }

    pub fn repo_path(&self) -> PathBuf {
        self.home.path().join("vscode-configs")
    }

    /// Config directory of the `vscode` app.
    pub fn user_dir(&self) -> PathBuf {
        self.home.path().join("Code/User")
    }

    /// Write a file relative to the layer repository, creating parents.
    pub fn write_layer_file(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.repo_path().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Read a JSON file from disk.
    pub fn read_json(&self, path: impl AsRef<Path>) -> Value {
        let text = std::fs::read_to_string(path.as_ref()).unwrap();
        serde_json::from_str(&text).unwrap()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse JSON output from a command.
pub fn parse_json(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("Failed to parse JSON output")
}
