//! Command implementations for the vsc-sync CLI.
//!
//! This module contains the business logic for each CLI command:
//! - `init` - Create the layer repository and the config file
//! - `apps` - Register, list and discover editors
//! - `apply` - Materialise merged layers into an editor's config directory
//! - `status` - Compare an editor's live files with the merged layers
//! - `setup_project` - Write `.vscode/` files for a project
//! - `pull` - Copy an editor's live files back into a layer
//! - `edit` - Open a layer file in an editor, optionally sorting it first
//! - `sort` - Canonically sort a keybindings or settings file
//!
//! Every command returns a value implementing [`Output`]; `main` prints it
//! as JSON or, with `-H`, as human-readable text.

pub mod apply;
pub mod apps;
pub mod edit;
pub mod init;
pub mod pull;
pub mod setup_project;
pub mod sort;
pub mod status;

pub use apply::{ApplyOptions, ApplyResult, Components, apply};
pub use apps::{AddAppResult, AppList, DiscoverResult, add_app, discover, list_apps};
pub use edit::{EditOptions, EditResult, EditTarget, Launcher, ProcessLauncher, edit};
pub use init::{InitOptions, InitResult, init};
pub use pull::{PullOptions, PullResult, PullSource, pull};
pub use setup_project::{SetupProjectOptions, SetupProjectResult, setup_project};
pub use sort::{SortFileResult, sort_file};
pub use status::{StatusReport, SyncStatus, status};

use crate::apps::AppDetails;
use crate::config::{ConfigOverrides, ConfigStore, VscSyncConfig, resolve_repo};
use crate::extensions::{EditorCli, ExtensionManager};
use crate::layers::LayerRepo;
use crate::{Error, Result};
use dialoguer::Confirm;
use dialoguer::theme::ColorfulTheme;
use serde::Serialize;
use std::io::IsTerminal;
use std::path::PathBuf;

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

/// Serialize a result for [`Output::to_json`].
pub(crate) fn json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|e| format!(r#"{{"error": "failed to serialize output: {}"}}"#, e))
}

/// Yes/no questions asked before destructive steps.
pub trait Prompt {
    fn confirm(&mut self, question: &str, default: bool) -> bool;
}

/// Asks on the terminal with a `dialoguer` confirm. A non-interactive
/// stdin declines, as does any prompt error.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn confirm(&mut self, question: &str, default: bool) -> bool {
        if !std::io::stdin().is_terminal() {
            tracing::debug!(question, "stdin is not a terminal, declining");
            return false;
        }

        match Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(question)
            .default(default)
            .interact()
        {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(question, error = %e, "prompt failed, declining");
                false
            }
        }
    }
}

/// Answers yes to everything (`--yes`, `--force`).
#[derive(Debug, Default)]
pub struct AssumeYes;

impl Prompt for AssumeYes {
    fn confirm(&mut self, question: &str, _default: bool) -> bool {
        tracing::debug!(question, "assuming yes");
        true
    }
}

/// Loaded configuration shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub store: ConfigStore,
    pub config: VscSyncConfig,
    pub overrides: ConfigOverrides,
    /// Home directory used for per-editor extension directories.
    pub home: Option<PathBuf>,
}

impl Context {
    /// Locate and load config.kdl.
    pub fn load(overrides: ConfigOverrides) -> Result<Self> {
        let store = ConfigStore::locate(&overrides)?;
        let config = store.load()?;
        Ok(Self {
            store,
            config,
            overrides,
            home: dirs::home_dir(),
        })
    }

    /// Build a context from parts.
    pub fn new(store: ConfigStore, config: VscSyncConfig, overrides: ConfigOverrides) -> Self {
        Self {
            store,
            config,
            overrides,
            home: dirs::home_dir(),
        }
    }

    /// Fail unless config.kdl exists.
    pub fn require_initialized(&self) -> Result<()> {
        if self.store.is_initialized() {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }

    /// Layer repository root after applying overrides.
    pub fn repo_path(&self) -> PathBuf {
        resolve_repo(&self.config, &self.overrides).value
    }

    pub fn open_repo(&self) -> Result<LayerRepo> {
        LayerRepo::open(self.repo_path())
    }

    pub fn app(&self, alias: &str) -> Result<&AppDetails> {
        self.config.app(alias)
    }

    /// A registered app whose config directory exists.
    pub fn installed_app(&self, alias: &str) -> Result<&AppDetails> {
        let app = self.app(alias)?;
        if !app.config_path.is_dir() {
            return Err(Error::AppConfigPath(app.config_path.clone()));
        }
        Ok(app)
    }

    /// Extension manager for a registered app.
    pub fn extension_manager(app: &AppDetails) -> Box<dyn ExtensionManager> {
        Box::new(EditorCli::for_app(app))
    }
}

/// Indent every line of `text` for nesting in human output.
pub(crate) fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|l| format!("{}{}", prefix, l))
        .collect::<Vec<_>>()
        .join("\n")
}
