//! Copy an editor's live configuration back into a layer.
//!
//! The source is a registered app's `User` directory or a project's
//! `.vscode/` directory. Existing layer files are replaced only with
//! `--overwrite` or after a per-file confirmation.

use super::{Context, Output, Prompt, json};
use crate::apps::AppDetails;
use crate::extensions::ExtensionManager;
use crate::fs::{Filesystem, OsFilesystem, ops, render_json};
use crate::layers::{Artifact, ExtensionsFile, LayerType};
use crate::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Where pulled files come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullSource {
    /// A registered app's config directory.
    App(String),
    /// A project directory containing `.vscode/`.
    Project(PathBuf),
}

#[derive(Debug, Clone)]
pub struct PullOptions {
    pub layer_type: LayerType,
    /// Layer name; app and project layers default to the source name.
    pub layer_name: Option<String>,
    pub settings: bool,
    pub keybindings: bool,
    pub snippets: bool,
    pub extensions: bool,
    pub overwrite: bool,
    pub dry_run: bool,
}

impl Default for PullOptions {
    fn default() -> Self {
        Self {
            layer_type: LayerType::App,
            layer_name: None,
            settings: true,
            keybindings: true,
            snippets: true,
            extensions: true,
            overwrite: false,
            dry_run: false,
        }
    }
}

impl PullOptions {
    /// Only settings.json.
    pub fn settings_only(mut self) -> Self {
        self.keybindings = false;
        self.snippets = false;
        self.extensions = false;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PullAction {
    Copied,
    WouldCopy,
    Skipped,
}

impl fmt::Display for PullAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PullAction::Copied => "pulled",
            PullAction::WouldCopy => "would pull",
            PullAction::Skipped => "skipped",
        };
        f.write_str(s)
    }
}

/// What happened to one artifact.
#[derive(Debug, Clone, Serialize)]
pub struct PullItem {
    pub artifact: Artifact,
    pub action: PullAction,
    pub detail: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PullResult {
    pub source: String,
    pub source_path: PathBuf,
    pub target: PathBuf,
    pub dry_run: bool,
    pub cancelled: bool,
    pub items: Vec<PullItem>,
}

impl Output for PullResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.cancelled {
            return "Pull cancelled.".to_string();
        }
        let mut lines = Vec::new();
        if self.dry_run {
            lines.push("DRY RUN - no changes made".to_string());
        }
        lines.push(format!(
            "{} ({}) -> {}",
            self.source,
            self.source_path.display(),
            self.target.display()
        ));
        for item in &self.items {
            lines.push(format!("  {} {}: {}", item.action, item.artifact, item.detail));
        }
        if !self.dry_run && self.items.iter().any(|i| i.action == PullAction::Copied) {
            lines.push("Review the pulled files, then commit them to your repository.".into());
        }
        lines.join("\n")
    }
}

fn resolve_source(ctx: &Context, source: &PullSource) -> Result<AppDetails> {
    match source {
        PullSource::App(alias) => ctx.installed_app(alias).cloned(),
        PullSource::Project(path) => {
            if !path.is_dir() {
                return Err(Error::InvalidInput(format!(
                    "Project directory does not exist: {}",
                    path.display()
                )));
            }
            let vscode = path.join(".vscode");
            if !vscode.is_dir() {
                return Err(Error::InvalidInput(format!(
                    "Project does not have a .vscode directory: {}",
                    vscode.display()
                )));
            }
            let name = path
                .canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
                .unwrap_or_else(|| "project".to_string());
            Ok(AppDetails::new(name, vscode))
        }
    }
}

struct Puller<'a, 'p> {
    target: &'a Path,
    opts: &'a PullOptions,
    prompt: &'a mut (dyn Prompt + 'p),
    items: Vec<PullItem>,
}

impl Puller<'_, '_> {
    fn skip(&mut self, artifact: Artifact, detail: impl Into<String>) {
        self.items.push(PullItem {
            artifact,
            action: PullAction::Skipped,
            detail: detail.into(),
        });
    }

    /// Decide whether `artifact` may be written; records a skip if not.
    fn may_write(&mut self, artifact: Artifact) -> bool {
        let dest = self.target.join(artifact.file_name());
        if !dest.exists() || self.opts.overwrite || self.opts.dry_run {
            return true;
        }
        let question = format!(
            "Overwrite existing {} in {}?",
            artifact.file_name(),
            self.target.display()
        );
        if self.prompt.confirm(&question, false) {
            true
        } else {
            self.skip(artifact, "existing file kept");
            false
        }
    }

    fn record(&mut self, artifact: Artifact, detail: String) {
        let action = if self.opts.dry_run {
            PullAction::WouldCopy
        } else {
            PullAction::Copied
        };
        self.items.push(PullItem {
            artifact,
            action,
            detail,
        });
    }

    fn pull_file(&mut self, source_dir: &Path, artifact: Artifact) -> Result<()> {
        let source = source_dir.join(artifact.file_name());
        if !source.is_file() {
            self.skip(artifact, format!("{} does not exist", source.display()));
            return Ok(());
        }
        if !self.may_write(artifact) {
            return Ok(());
        }
        if !self.opts.dry_run {
            ops::copy_file(&source, &self.target.join(artifact.file_name()))?;
        }
        self.record(artifact, source.display().to_string());
        Ok(())
    }

    fn pull_snippets(&mut self, source_dir: &Path) -> Result<()> {
        let artifact = Artifact::Snippets;
        let source = source_dir.join(artifact.file_name());
        let files: Vec<PathBuf> = ops::snippet_files(&source)?
            .into_iter()
            .filter(|p| p.extension().is_some_and(|e| e == "code-snippets"))
            .collect();
        if files.is_empty() {
            self.skip(artifact, "no snippet files found");
            return Ok(());
        }
        if !self.may_write(artifact) {
            return Ok(());
        }
        if !self.opts.dry_run {
            ops::copy_dir_contents(&source, &self.target.join(artifact.file_name()), true)?;
        }
        self.record(artifact, format!("{} snippet files", files.len()));
        Ok(())
    }

    fn pull_extensions(&mut self, manager: Option<&dyn ExtensionManager>) -> Result<()> {
        let artifact = Artifact::Extensions;
        let Some(manager) = manager else {
            self.skip(artifact, "no executable configured");
            return Ok(());
        };
        let mut installed = match manager.list_installed() {
            Ok(installed) => installed,
            Err(e) => {
                tracing::warn!("cannot list installed extensions: {}", e);
                self.skip(artifact, e.to_string());
                return Ok(());
            }
        };
        if installed.is_empty() {
            self.skip(artifact, "no extensions installed");
            return Ok(());
        }
        if !self.may_write(artifact) {
            return Ok(());
        }
        installed.sort();
        let count = installed.len();
        if !self.opts.dry_run {
            let file = ExtensionsFile {
                recommendations: installed,
            };
            OsFilesystem.write(
                &self.target.join(artifact.file_name()),
                &render_json(&serde_json::to_value(&file)?)?,
            )?;
        }
        self.record(artifact, format!("{} extensions", count));
        Ok(())
    }
}

/// Pull live files into a layer of the repository.
///
/// `manager` lists installed extensions; pass `None` when the source has
/// no executable (always the case for projects).
pub fn pull(
    ctx: &Context,
    source: &PullSource,
    opts: &PullOptions,
    manager: Option<&dyn ExtensionManager>,
    prompt: &mut dyn Prompt,
) -> Result<PullResult> {
    let details = resolve_source(ctx, source)?;
    let repo = ctx.open_repo()?;

    let name = match opts.layer_type {
        LayerType::App | LayerType::Project => {
            Some(opts.layer_name.clone().unwrap_or_else(|| details.alias.clone()))
        }
        _ => opts.layer_name.clone(),
    };
    let target = repo.layer_path(opts.layer_type, name.as_deref())?;

    let mut result = PullResult {
        source: details.alias.clone(),
        source_path: details.config_path.clone(),
        target: target.clone(),
        dry_run: opts.dry_run,
        ..Default::default()
    };

    if !opts.dry_run && !opts.overwrite {
        let question = format!(
            "Pull configuration from {} into {}?",
            details.config_path.display(),
            target.display()
        );
        if !prompt.confirm(&question, true) {
            result.cancelled = true;
            return Ok(result);
        }
    }
    if !opts.dry_run && !target.is_dir() {
        tracing::info!(path = %target.display(), "creating layer directory");
        std::fs::create_dir_all(&target)?;
    }

    let mut puller = Puller {
        target: &target,
        opts,
        prompt,
        items: Vec::new(),
    };
    let source_dir = &details.config_path;
    if opts.settings {
        puller.pull_file(source_dir, Artifact::Settings)?;
    }
    if opts.keybindings {
        puller.pull_file(source_dir, Artifact::Keybindings)?;
    }
    if opts.snippets {
        puller.pull_snippets(source_dir)?;
    }
    if opts.extensions {
        let manager = match source {
            PullSource::App(_) if details.executable_path.is_some() => manager,
            _ => None,
        };
        puller.pull_extensions(manager)?;
    }

    result.items = puller.items;
    Ok(result)
}
