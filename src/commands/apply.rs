//! Materialise merged layers into an editor's config directory.
//!
//! Order of operations: merge, plan extensions, confirm, back up, remove
//! the managed files, write. Nothing on disk changes before the merge has
//! succeeded and the user has confirmed.

use super::status::{SettingsDiff, read_live_settings};
use super::{Context, Output, Prompt, json};
use crate::apps::extension_directory_in;
use crate::extensions::{ExtensionManager, ExtensionPlan, ExtensionReport, execute_plan};
use crate::fs::{Filesystem, OsFilesystem, ops, render_json};
use crate::layers::{Artifact, MergeResult};
use crate::Result;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

/// Which artifacts an apply touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Components {
    pub settings: bool,
    pub keybindings: bool,
    pub extensions: bool,
    pub snippets: bool,
    pub tasks: bool,
}

impl Default for Components {
    fn default() -> Self {
        Self {
            settings: true,
            keybindings: true,
            extensions: true,
            snippets: true,
            tasks: true,
        }
    }
}

impl Components {
    /// Managed files and directories removed before writing.
    fn managed(&self) -> Vec<Artifact> {
        let mut managed = Vec::new();
        if self.settings {
            managed.push(Artifact::Settings);
        }
        if self.keybindings {
            managed.push(Artifact::Keybindings);
        }
        if self.tasks {
            managed.push(Artifact::Tasks);
        }
        if self.snippets {
            managed.push(Artifact::Snippets);
        }
        managed
    }
}

#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    pub stacks: Vec<String>,
    pub components: Components,
    /// Suffix for the backup directory; `bak.<unix ts>` when unset.
    pub backup_suffix: Option<String>,
    pub dry_run: bool,
    /// Skip the confirmation prompt.
    pub force: bool,
    /// Uninstall extensions no layer recommends.
    pub prune_extensions: bool,
    /// Delete the editor's extension directory and reinstall from scratch.
    pub clean_extensions: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ApplyResult {
    pub app: String,
    pub config_path: PathBuf,
    pub dry_run: bool,
    pub cancelled: bool,
    pub layers_applied: Vec<String>,
    pub skipped: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<PathBuf>,
    /// Managed files removed before writing.
    pub cleaned: Vec<String>,
    pub settings_changes: SettingsDiff,
    pub settings_written: bool,
    pub keybindings_source: Option<PathBuf>,
    pub tasks_source: Option<PathBuf>,
    pub snippets_copied: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension_plan: Option<ExtensionPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension_report: Option<ExtensionReport>,
    /// Why extensions were left alone, if they were.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions_skipped: Option<String>,
    pub extensions_cleaned: bool,
}

impl Output for ApplyResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.cancelled {
            return "Apply cancelled.".to_string();
        }

        let mut lines = Vec::new();
        if self.dry_run {
            lines.push(format!(
                "DRY RUN - no changes made to {} ({})",
                self.app,
                self.config_path.display()
            ));
        } else {
            lines.push(format!(
                "Applied configuration to {} ({})",
                self.app,
                self.config_path.display()
            ));
        }
        lines.push(format!("  layers: {}", self.layers_applied.join(" -> ")));
        for skipped in &self.skipped {
            lines.push(format!("  warning: {}", skipped));
        }
        if let Some(ref backup) = self.backup {
            lines.push(format!("  backup: {}", backup.display()));
        }
        if !self.cleaned.is_empty() {
            lines.push(format!("  removed: {}", self.cleaned.join(", ")));
        }

        if self.settings_changes.is_empty() {
            lines.push("  settings: no changes".to_string());
        } else {
            lines.push(format!(
                "  settings: {} differences",
                self.settings_changes.len()
            ));
            for line in self.settings_changes.summary(3) {
                lines.push(format!("    {}", line));
            }
        }
        let source = |p: &Option<PathBuf>| {
            p.as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "none".to_string())
        };
        lines.push(format!("  keybindings: {}", source(&self.keybindings_source)));
        lines.push(format!("  tasks: {}", source(&self.tasks_source)));
        if !self.dry_run {
            lines.push(format!("  snippets: {} files copied", self.snippets_copied));
        }

        if let Some(ref reason) = self.extensions_skipped {
            lines.push(format!("  extensions: skipped ({})", reason));
        }
        if let Some(ref plan) = self.extension_plan {
            if self.dry_run {
                lines.push(format!(
                    "  extensions: {} to install, {} to uninstall, {} already installed",
                    plan.to_install.len(),
                    plan.to_uninstall.len(),
                    plan.already_installed.len()
                ));
                for id in &plan.to_install {
                    lines.push(format!("    + {}", id));
                }
                for id in &plan.to_uninstall {
                    lines.push(format!("    - {}", id));
                }
            }
        }
        if let Some(ref report) = self.extension_report {
            lines.push(format!(
                "  extensions: {} installed, {} uninstalled",
                report.installed.len(),
                report.uninstalled.len()
            ));
            for (id, error) in &report.failed {
                lines.push(format!("    failed {}: {}", id, error));
            }
        }
        lines.join("\n")
    }
}

/// Extension plan for an apply, or the reason extensions are skipped.
fn plan_extensions(
    merge: &MergeResult,
    has_executable: bool,
    opts: &ApplyOptions,
    manager: &dyn ExtensionManager,
) -> std::result::Result<ExtensionPlan, String> {
    if !opts.components.extensions {
        return Err("disabled".to_string());
    }
    if merge.extensions.is_empty() {
        return Err("no extensions recommended by any layer".to_string());
    }
    if !has_executable {
        return Err("no executable configured".to_string());
    }
    if opts.clean_extensions && !opts.dry_run {
        return Ok(ExtensionPlan::compute(&merge.extensions, &[], false));
    }
    let installed = manager.list_installed().map_err(|e| {
        tracing::warn!("cannot list installed extensions: {}", e);
        e.to_string()
    })?;
    Ok(ExtensionPlan::compute(
        &merge.extensions,
        &installed,
        opts.prune_extensions,
    ))
}

/// Apply the merged layers for `alias`.
pub fn apply(
    ctx: &Context,
    alias: &str,
    opts: &ApplyOptions,
    manager: &dyn ExtensionManager,
    prompt: &mut dyn Prompt,
) -> Result<ApplyResult> {
    let app = ctx.installed_app(alias)?;
    let fs = OsFilesystem;
    let dir = &app.config_path;

    let merge = ctx.open_repo()?.merge_layers(Some(alias), &opts.stacks)?;

    let current = read_live_settings(&fs, &dir.join(Artifact::Settings.file_name()))
        .unwrap_or_else(|e| {
            tracing::warn!("cannot read current settings: {}", e);
            Default::default()
        });
    let mut result = ApplyResult {
        app: alias.to_string(),
        config_path: dir.clone(),
        dry_run: opts.dry_run,
        layers_applied: merge.layers_applied.iter().map(|l| l.label()).collect(),
        skipped: merge.skipped.iter().map(|s| s.to_string()).collect(),
        keybindings_source: merge
            .keybindings_source
            .clone()
            .filter(|_| opts.components.keybindings),
        tasks_source: merge.tasks_source.clone().filter(|_| opts.components.tasks),
        ..Default::default()
    };
    if opts.components.settings {
        result.settings_changes = SettingsDiff::compute(&current, &merge.merged_settings);
    }

    match plan_extensions(&merge, app.executable_path.is_some(), opts, manager) {
        Ok(plan) => result.extension_plan = Some(plan),
        Err(reason) => result.extensions_skipped = Some(reason),
    }

    if opts.dry_run {
        return Ok(result);
    }

    if !opts.force
        && !prompt.confirm(
            &format!("Apply configuration to {} ({})?", alias, dir.display()),
            true,
        )
    {
        result.cancelled = true;
        return Ok(result);
    }

    let suffix = opts
        .backup_suffix
        .clone()
        .unwrap_or_else(ops::default_backup_suffix);
    result.backup = Some(ops::backup_directory(dir, &suffix)?);

    for artifact in opts.components.managed() {
        if ops::remove_path(&dir.join(artifact.file_name()))? {
            tracing::debug!(artifact = %artifact, "removed managed file");
            result.cleaned.push(artifact.file_name().to_string());
        }
    }

    if opts.components.settings {
        let rendered = render_json(&Value::Object(merge.merged_settings.clone()))?;
        fs.write(&dir.join(Artifact::Settings.file_name()), &rendered)?;
        result.settings_written = true;
    }
    if let Some(ref source) = result.keybindings_source {
        ops::copy_file(source, &dir.join(Artifact::Keybindings.file_name()))?;
    }
    if let Some(ref source) = result.tasks_source {
        ops::copy_file(source, &dir.join(Artifact::Tasks.file_name()))?;
    }
    if opts.components.snippets && !merge.snippets_paths.is_empty() {
        let target = dir.join(Artifact::Snippets.file_name());
        for source in &merge.snippets_paths {
            result.snippets_copied += ops::copy_dir_contents(source, &target, true)?;
        }
    }

    if let Some(ref plan) = result.extension_plan {
        if opts.clean_extensions {
            if let Some(ref home) = ctx.home {
                let ext_dir = extension_directory_in(home, alias);
                match ops::remove_path(&ext_dir) {
                    Ok(removed) => result.extensions_cleaned = removed,
                    Err(e) => tracing::warn!(
                        path = %ext_dir.display(),
                        "failed to clean extensions directory: {}",
                        e
                    ),
                }
            }
        }
        result.extension_report = Some(execute_plan(manager, plan));
    }

    tracing::info!(app = alias, layers = result.layers_applied.len(), "applied configuration");
    Ok(result)
}
