//! Open a layer file (or an editor's live file) for editing.

use super::{Context, Output, Prompt, json};
use crate::fs::{Filesystem, OsFilesystem};
use crate::layers::{Artifact, LayerType};
use crate::sort::{self, SortKind, SortPlan};
use crate::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Editors tried, in order, when none is configured.
const FALLBACK_EDITORS: [&str; 3] = ["code", "codium", "cursor"];

/// What to edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    /// A file in the layer repository.
    Layer(LayerType, Option<String>),
    /// A file in a registered app's config directory.
    Live(String),
}

#[derive(Debug, Clone)]
pub struct EditOptions {
    pub artifact: Artifact,
    /// Canonically sort the file before opening it.
    pub sort: bool,
    /// Write the sorted file without asking.
    pub yes: bool,
    /// Launch the editor. Off for `--no-open`.
    pub open: bool,
}

impl Default for EditOptions {
    fn default() -> Self {
        Self {
            artifact: Artifact::Settings,
            sort: false,
            yes: false,
            open: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EditResult {
    pub path: PathBuf,
    pub created: bool,
    pub cancelled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sorted: Option<SortedFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,
}

/// Outcome of `--sort`.
#[derive(Debug, Clone, Serialize)]
pub struct SortedFile {
    pub kind: SortKind,
    pub entries: usize,
    pub changed: bool,
    pub written: bool,
}

impl Output for EditResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.cancelled {
            return "Edit cancelled.".to_string();
        }
        let mut lines = Vec::new();
        if self.created {
            lines.push(format!("Created {}", self.path.display()));
        }
        if let Some(ref sorted) = self.sorted {
            let what = match sorted.kind {
                SortKind::Keybindings => "keybindings",
                SortKind::Settings => "settings",
            };
            if !sorted.changed {
                lines.push(format!("{} {} already sorted", sorted.entries, what));
            } else if sorted.written {
                lines.push(format!("Sorted {} {}", sorted.entries, what));
            } else {
                lines.push("Sort not written".to_string());
            }
        }
        match self.editor {
            Some(ref editor) => lines.push(format!("Opened {} in {}", self.path.display(), editor)),
            None => lines.push(self.path.display().to_string()),
        }
        lines.join("\n")
    }
}

/// Opens a path in an editor.
pub trait Launcher {
    fn open(&self, editor: &str, path: &Path) -> Result<()>;
}

/// Spawns the editor and waits for it to exit.
///
/// The editor string is split on whitespace, so `"code --wait"` works.
#[derive(Debug, Default)]
pub struct ProcessLauncher;

impl Launcher for ProcessLauncher {
    fn open(&self, editor: &str, path: &Path) -> Result<()> {
        let mut parts = editor.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| Error::InvalidInput("editor command is empty".to_string()))?;
        tracing::debug!(editor, path = %path.display(), "launching editor");
        let status = Command::new(program)
            .args(parts)
            .arg(path)
            .status()
            .map_err(|e| Error::Other(format!("Editor '{}' could not be started: {}", editor, e)))?;
        if !status.success() {
            return Err(Error::Other(format!(
                "Editor '{}' exited with {}",
                editor, status
            )));
        }
        Ok(())
    }
}

/// Platform opener used when no editor is found.
pub fn system_opener() -> &'static str {
    match std::env::consts::OS {
        "macos" => "open",
        "windows" => "explorer",
        _ => "xdg-open",
    }
}

/// Pick an editor: the configured one, else the first of code, codium
/// and cursor that `available` accepts, else the platform opener.
pub fn choose_editor<F>(configured: Option<&str>, available: F) -> String
where
    F: Fn(&str) -> bool,
{
    if let Some(editor) = configured.filter(|e| !e.trim().is_empty()) {
        return editor.to_string();
    }
    FALLBACK_EDITORS
        .iter()
        .find(|e| available(e))
        .map(|e| e.to_string())
        .unwrap_or_else(|| system_opener().to_string())
}

/// Path of the file (or snippets directory) to edit.
pub fn edit_path(ctx: &Context, target: &EditTarget, artifact: Artifact) -> Result<PathBuf> {
    match target {
        EditTarget::Live(alias) => Ok(ctx.app(alias)?.config_path.join(artifact.file_name())),
        EditTarget::Layer(layer_type, name) => {
            if *layer_type == LayerType::App {
                if let Some(alias) = name {
                    ctx.app(alias)?;
                }
            }
            let repo = ctx.open_repo()?;
            Ok(repo
                .layer_path(*layer_type, name.as_deref())?
                .join(artifact.file_name()))
        }
    }
}

fn sort_before_edit(
    path: &Path,
    artifact: Artifact,
    yes: bool,
    prompt: &mut dyn Prompt,
) -> Result<SortedFile> {
    let fs = OsFilesystem;
    let plan: SortPlan = match artifact {
        Artifact::Keybindings => sort::plan_keybindings_sort(&fs, path)?,
        Artifact::Settings => sort::plan_settings_sort(&fs, path)?,
        other => {
            return Err(Error::InvalidInput(format!(
                "--sort applies to keybindings or settings, not {}",
                other
            )));
        }
    };

    let written = plan.changed
        && (yes
            || prompt.confirm(
                &format!(
                    "Rewrite {} with {} sorted entries? Comments will be removed.",
                    path.display(),
                    plan.entries
                ),
                true,
            ));
    if written {
        plan.write(&fs)?;
    }
    Ok(SortedFile {
        kind: plan.kind,
        entries: plan.entries,
        changed: plan.changed,
        written,
    })
}

/// Resolve, create if needed, optionally sort, then open the file.
pub fn edit(
    ctx: &Context,
    target: &EditTarget,
    opts: &EditOptions,
    prompt: &mut dyn Prompt,
    launcher: &dyn Launcher,
) -> Result<EditResult> {
    if opts.sort && !matches!(opts.artifact, Artifact::Keybindings | Artifact::Settings) {
        return Err(Error::InvalidInput(format!(
            "--sort applies to keybindings or settings, not {}",
            opts.artifact
        )));
    }

    let path = edit_path(ctx, target, opts.artifact)?;
    let mut result = EditResult {
        path: path.clone(),
        ..Default::default()
    };

    if !path.exists() {
        let question = if opts.artifact.is_directory() {
            format!("Create snippets directory {}?", path.display())
        } else {
            format!("Create {}?", path.display())
        };
        if !prompt.confirm(&question, true) {
            result.cancelled = true;
            return Ok(result);
        }
        match opts.artifact.initial_content() {
            Some(content) => OsFilesystem.write(&path, content)?,
            None => std::fs::create_dir_all(&path)?,
        }
        tracing::info!(path = %path.display(), "created file");
        result.created = true;
    }

    if opts.sort {
        result.sorted = Some(sort_before_edit(&path, opts.artifact, opts.yes, prompt)?);
    }

    if opts.open {
        let editor = choose_editor(ctx.config.default_editor.as_deref(), |e| {
            which::which(e).is_ok()
        });
        launcher.open(&editor, &path)?;
        result.editor = Some(editor);
    }
    Ok(result)
}
