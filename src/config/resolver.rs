//! Precedence resolution for the config file location and the layer repo.
//!
//! ## Config file (highest to lowest)
//!
//! 1. `--config` CLI flag
//! 2. `VSC_SYNC_CONFIG` environment variable
//! 3. `<config dir>/vsc-sync/config.kdl` (e.g. `~/.config/vsc-sync/config.kdl`)
//!
//! ## Layer repository (highest to lowest)
//!
//! 1. `--repo` CLI flag
//! 2. `VSC_SYNC_REPO` environment variable
//! 3. `repo` in config.kdl
//! 4. `~/vscode-configs`

use super::schema::VscSyncConfig;
use crate::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file path.
pub const CONFIG_ENV: &str = "VSC_SYNC_CONFIG";

/// Environment variable overriding the layer repository path.
pub const REPO_ENV: &str = "VSC_SYNC_REPO";

/// Directory name under the platform config dir.
pub const APP_DIR: &str = "vsc-sync";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueSource {
    /// Value from CLI flag
    CliFlag,
    /// Value from environment variable
    EnvVar(String),
    /// Value from config.kdl
    ConfigFile,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::ConfigFile => write!(f, "config"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone, Serialize)]
pub struct Resolved<T> {
    pub value: T,
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// CLI overrides for path resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub repo: Option<PathBuf>,
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Expand a leading `~` to the home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

/// Default config file location.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.kdl"))
}

/// Default layer repository location.
pub fn default_repo_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vscode-configs")
}

/// Resolve the config file path.
pub fn resolve_config_path(overrides: &ConfigOverrides) -> Result<Resolved<PathBuf>> {
    if let Some(ref path) = overrides.config_path {
        return Ok(Resolved::new(expand_tilde(path), ValueSource::CliFlag));
    }
    if let Some(path) = env_path(CONFIG_ENV) {
        return Ok(Resolved::new(
            expand_tilde(&path),
            ValueSource::EnvVar(CONFIG_ENV.to_string()),
        ));
    }
    default_config_path()
        .map(|p| Resolved::new(p, ValueSource::Default))
        .ok_or_else(|| {
            Error::Other(format!(
                "Cannot determine a config directory; set {} or pass --config",
                CONFIG_ENV
            ))
        })
}

/// Resolve the layer repository path.
pub fn resolve_repo(config: &VscSyncConfig, overrides: &ConfigOverrides) -> Resolved<PathBuf> {
    if let Some(ref path) = overrides.repo {
        return Resolved::new(expand_tilde(path), ValueSource::CliFlag);
    }
    if let Some(path) = env_path(REPO_ENV) {
        return Resolved::new(
            expand_tilde(&path),
            ValueSource::EnvVar(REPO_ENV.to_string()),
        );
    }
    if let Some(ref path) = config.repo {
        return Resolved::new(expand_tilde(path), ValueSource::ConfigFile);
    }
    Resolved::new(default_repo_path(), ValueSource::Default)
}
