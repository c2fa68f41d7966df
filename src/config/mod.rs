//! Configuration for vsc-sync itself.
//!
//! ## config.kdl
//!
//! Located at `~/.config/vsc-sync/config.kdl` by default (see [`resolver`]
//! for overrides). Contains:
//! - `repo` - Path to the layer repository
//! - `default-editor` - Editor command for `edit`
//! - `app "<alias>" { ... }` - Registered editors with `config-path` and
//!   optional `executable`
//!
//! A missing file loads as the default config. The tool counts as
//! initialized only once the file exists.

pub mod resolver;
pub mod schema;

pub use resolver::{
    CONFIG_ENV, ConfigOverrides, REPO_ENV, Resolved, ValueSource, default_repo_path,
    expand_tilde, resolve_config_path, resolve_repo,
};
pub use schema::VscSyncConfig;

use crate::fs::{Filesystem, OsFilesystem};
use crate::{Error, Result};
use kdl::KdlDocument;
use std::path::{Path, PathBuf};

/// Reads and writes config.kdl at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Locate the config file using CLI flag, env var, then the default.
    pub fn locate(overrides: &ConfigOverrides) -> Result<Self> {
        let resolved = resolve_config_path(overrides)?;
        tracing::debug!(
            path = %resolved.value.display(),
            source = %resolved.source,
            "config path"
        );
        Ok(Self::new(resolved.value))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_initialized(&self) -> bool {
        self.path.is_file()
    }

    /// Load the config; a missing file yields the default.
    pub fn load(&self) -> Result<VscSyncConfig> {
        if !self.is_initialized() {
            return Ok(VscSyncConfig::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        let doc: KdlDocument = content.parse().map_err(|e: kdl::KdlError| Error::Kdl {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        VscSyncConfig::from_kdl(&doc).map_err(|message| Error::Kdl {
            path: self.path.clone(),
            message,
        })
    }

    /// Write the config, creating parent directories.
    pub fn save(&self, config: &VscSyncConfig) -> Result<()> {
        let mut content = String::from("// vsc-sync configuration\n");
        content.push_str(&config.to_kdl_string());
        OsFilesystem.write(&self.path, &content)?;
        tracing::info!(path = %self.path.display(), "saved config");
        Ok(())
    }
}
