//! Write `.vscode/settings.json` and `.vscode/extensions.json` for a project.

use super::{Context, Output, Prompt, json};
use crate::fs::{Filesystem, OsFilesystem, render_json};
use crate::layers::{Artifact, ExtensionsFile};
use crate::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct SetupProjectOptions {
    /// `projects/<type>` layer applied first.
    pub project_type: Option<String>,
    pub stacks: Vec<String>,
    /// Overwrite existing files without asking.
    pub force: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SetupProjectResult {
    pub project: PathBuf,
    pub vscode_dir: PathBuf,
    pub layers_applied: Vec<String>,
    pub written: Vec<PathBuf>,
    pub cancelled: bool,
}

impl Output for SetupProjectResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.cancelled {
            return "Setup cancelled.".to_string();
        }
        let mut lines = vec![format!(
            "Set up {} from {}",
            self.vscode_dir.display(),
            self.layers_applied.join(" -> ")
        )];
        if self.written.is_empty() {
            lines.push("  nothing to write: the layers define no settings or extensions".into());
        }
        for path in &self.written {
            lines.push(format!("  wrote {}", path.display()));
        }
        lines.join("\n")
    }
}

/// Merge `projects/<type>` and stacks into `<project>/.vscode/`.
///
/// Every named layer must exist. Settings and extensions files are only
/// written when the merge produced something for them.
pub fn setup_project(
    ctx: &Context,
    project: &Path,
    opts: &SetupProjectOptions,
    prompt: &mut dyn Prompt,
) -> Result<SetupProjectResult> {
    if !project.exists() {
        return Err(Error::InvalidInput(format!(
            "Project path does not exist: {}",
            project.display()
        )));
    }
    if !project.is_dir() {
        return Err(Error::InvalidInput(format!(
            "Project path is not a directory: {}",
            project.display()
        )));
    }

    let merge = ctx
        .open_repo()?
        .merge_project_layers(opts.project_type.as_deref(), &opts.stacks)?;

    let vscode_dir = project.join(".vscode");
    let mut files: Vec<(PathBuf, String)> = Vec::new();
    if !merge.merged_settings.is_empty() {
        files.push((
            vscode_dir.join(Artifact::Settings.file_name()),
            render_json(&Value::Object(merge.merged_settings.clone()))?,
        ));
    }
    if !merge.extensions.is_empty() {
        let extensions = ExtensionsFile {
            recommendations: merge.extensions.clone(),
        };
        files.push((
            vscode_dir.join(Artifact::Extensions.file_name()),
            render_json(&serde_json::to_value(&extensions)?)?,
        ));
    }

    let mut result = SetupProjectResult {
        project: project.to_path_buf(),
        vscode_dir: vscode_dir.clone(),
        layers_applied: merge.layers_applied.iter().map(|l| l.label()).collect(),
        ..Default::default()
    };

    let existing: Vec<String> = files
        .iter()
        .filter(|(path, _)| path.exists())
        .filter_map(|(path, _)| path.file_name().map(|n| n.to_string_lossy().to_string()))
        .collect();
    if !opts.force
        && !existing.is_empty()
        && !prompt.confirm(
            &format!(
                "Overwrite existing {} in {}?",
                existing.join(", "),
                vscode_dir.display()
            ),
            false,
        )
    {
        result.cancelled = true;
        return Ok(result);
    }

    let fs = OsFilesystem;
    for (path, contents) in files {
        fs.write(&path, &contents)?;
        tracing::debug!(path = %path.display(), "wrote project file");
        result.written.push(path);
    }
    Ok(result)
}
