//! Extension management through an editor's command line.
//!
//! [`EditorCli`] runs `<editor> --list-extensions`, `--install-extension`
//! and `--uninstall-extension`. Each call has a timeout; a process that
//! outlives it is killed and reported as [`ExtensionError::Timeout`].

use crate::apps::AppDetails;
use serde::Serialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;
use wait_timeout::ChildExt;

pub const LIST_TIMEOUT: Duration = Duration::from_secs(30);
pub const INSTALL_TIMEOUT: Duration = Duration::from_secs(120);
pub const UNINSTALL_TIMEOUT: Duration = Duration::from_secs(60);

/// Errors from talking to an editor's extension CLI.
#[derive(Debug, thiserror::Error)]
pub enum ExtensionError {
    #[error("No executable configured for app '{alias}'")]
    NoExecutable { alias: String },

    #[error("Failed to run {executable}: {source}")]
    Spawn {
        executable: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Timed out after {timeout:?} while trying to {operation}")]
    Timeout { operation: String, timeout: Duration },

    #[error("Failed to {operation} (exit status {status}): {stderr}")]
    Failed {
        operation: String,
        status: String,
        stderr: String,
    },
}

/// List, install and uninstall extensions for one editor.
pub trait ExtensionManager {
    /// Installed extension identifiers.
    fn list_installed(&self) -> Result<Vec<String>, ExtensionError>;

    fn install(&self, id: &str) -> Result<(), ExtensionError>;

    fn uninstall(&self, id: &str) -> Result<(), ExtensionError>;
}

/// [`ExtensionManager`] backed by the editor executable.
#[derive(Debug, Clone)]
pub struct EditorCli {
    alias: String,
    executable: Option<PathBuf>,
}

impl EditorCli {
    pub fn new(alias: impl Into<String>, executable: Option<PathBuf>) -> Self {
        Self {
            alias: alias.into(),
            executable,
        }
    }

    pub fn for_app(app: &AppDetails) -> Self {
        Self::new(app.alias.clone(), app.executable_path.clone())
    }

    /// Run the editor with `args`, returning stdout on success.
    fn run(
        &self,
        args: &[&str],
        operation: String,
        timeout: Duration,
    ) -> Result<String, ExtensionError> {
        let executable = self
            .executable
            .clone()
            .ok_or_else(|| ExtensionError::NoExecutable {
                alias: self.alias.clone(),
            })?;

        tracing::debug!(executable = %executable.display(), ?args, "running editor");
        let mut child = Command::new(&executable)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ExtensionError::Spawn {
                executable: executable.clone(),
                source,
            })?;

        // Pipes are read on their own threads while we wait
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let status = match child.wait_timeout(timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ExtensionError::Timeout {
                    operation,
                    timeout,
                });
            }
            Err(source) => {
                let _ = child.kill();
                return Err(ExtensionError::Spawn { executable, source });
            }
        };

        let stdout = stdout.and_then(|h| h.join().ok()).unwrap_or_default();
        let stderr = stderr.and_then(|h| h.join().ok()).unwrap_or_default();

        if !status.success() {
            return Err(ExtensionError::Failed {
                operation,
                status: status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string()),
                stderr: stderr.trim().to_string(),
            });
        }
        Ok(stdout)
    }
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = reader.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}

impl ExtensionManager for EditorCli {
    fn list_installed(&self) -> Result<Vec<String>, ExtensionError> {
        let out = self.run(
            &["--list-extensions"],
            format!("list extensions for {}", self.alias),
            LIST_TIMEOUT,
        )?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }

    fn install(&self, id: &str) -> Result<(), ExtensionError> {
        self.run(
            &["--install-extension", id],
            format!("install extension {} for {}", id, self.alias),
            INSTALL_TIMEOUT,
        )?;
        tracing::info!(extension = id, app = %self.alias, "installed extension");
        Ok(())
    }

    fn uninstall(&self, id: &str) -> Result<(), ExtensionError> {
        self.run(
            &["--uninstall-extension", id],
            format!("uninstall extension {} for {}", id, self.alias),
            UNINSTALL_TIMEOUT,
        )?;
        tracing::info!(extension = id, app = %self.alias, "uninstalled extension");
        Ok(())
    }
}

/// Extension changes needed to reach a target list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtensionPlan {
    /// Targets not yet installed, in target order.
    pub to_install: Vec<String>,
    /// Installed but not targeted; only filled when pruning.
    pub to_uninstall: Vec<String>,
    pub already_installed: Vec<String>,
}

impl ExtensionPlan {
    /// Compare target and installed lists. Identifiers compare case-insensitively,
    /// as editors report them in varying case.
    pub fn compute(target: &[String], installed: &[String], prune: bool) -> Self {
        let installed_set: HashSet<String> =
            installed.iter().map(|e| e.to_lowercase()).collect();
        let target_set: HashSet<String> = target.iter().map(|e| e.to_lowercase()).collect();

        let (already_installed, to_install): (Vec<String>, Vec<String>) = target
            .iter()
            .cloned()
            .partition(|e| installed_set.contains(&e.to_lowercase()));
        let to_uninstall = if prune {
            installed
                .iter()
                .filter(|e| !target_set.contains(&e.to_lowercase()))
                .cloned()
                .collect()
        } else {
            Vec::new()
        };

        Self {
            to_install,
            to_uninstall,
            already_installed,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_install.is_empty() && self.to_uninstall.is_empty()
    }
}

/// Outcome of executing an [`ExtensionPlan`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtensionReport {
    pub installed: Vec<String>,
    pub uninstalled: Vec<String>,
    /// `(extension, error message)` for every failed call.
    pub failed: Vec<(String, String)>,
}

/// Execute a plan, continuing past individual failures.
pub fn execute_plan(manager: &dyn ExtensionManager, plan: &ExtensionPlan) -> ExtensionReport {
    let mut report = ExtensionReport::default();
    for id in &plan.to_install {
        match manager.install(id) {
            Ok(()) => report.installed.push(id.clone()),
            Err(e) => {
                tracing::warn!(extension = %id, "install failed: {}", e);
                report.failed.push((id.clone(), e.to_string()));
            }
        }
    }
    for id in &plan.to_uninstall {
        match manager.uninstall(id) {
            Ok(()) => report.uninstalled.push(id.clone()),
            Err(e) => {
                tracing::warn!(extension = %id, "uninstall failed: {}", e);
                report.failed.push((id.clone(), e.to_string()));
            }
        }
    }
    report
}
