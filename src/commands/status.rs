//! Compare an editor's live files with the merged layers.
//!
//! Each component gets a [`SyncStatus`]:
//! - settings: structural equality, with a flattened dotted-key diff
//! - keybindings: whitespace-trimmed text of the winning layer file
//! - snippets: `*.code-snippets` file names and trimmed contents
//! - extensions: set equality, `Unknown` if the editor cannot list them

use super::{Context, Output, indent, json};
use crate::apps::AppDetails;
use crate::extensions::ExtensionManager;
use crate::fs::{Filesystem, OsFilesystem};
use crate::jsonc;
use crate::layers::MergeResult;
use crate::{Error, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

/// Sync state of one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncStatus {
    InSync,
    OutOfSync,
    /// Layers define it, the editor does not have it.
    Missing,
    /// The editor has it, no layer defines it.
    Extra,
    Unknown,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SyncStatus::InSync => "IN SYNC",
            SyncStatus::OutOfSync => "OUT OF SYNC",
            SyncStatus::Missing => "MISSING",
            SyncStatus::Extra => "EXTRA",
            SyncStatus::Unknown => "UNKNOWN",
        };
        write!(f, "{}", s)
    }
}

/// Combine component states: any difference wins over unknown, which wins
/// over in-sync.
pub fn overall(statuses: &[SyncStatus]) -> SyncStatus {
    let differs = statuses.iter().any(|s| {
        matches!(
            s,
            SyncStatus::OutOfSync | SyncStatus::Missing | SyncStatus::Extra
        )
    });
    if differs {
        SyncStatus::OutOfSync
    } else if statuses.contains(&SyncStatus::Unknown) {
        SyncStatus::Unknown
    } else {
        SyncStatus::InSync
    }
}

/// Dotted setting keys that differ between live and target settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SettingsDiff {
    /// In the target only.
    pub added: Vec<String>,
    /// In both with different values.
    pub modified: Vec<String>,
    /// In the live file only.
    pub removed: Vec<String>,
}

impl SettingsDiff {
    pub fn compute(current: &Map<String, Value>, target: &Map<String, Value>) -> Self {
        let current = flatten(current);
        let target = flatten(target);

        let mut diff = Self::default();
        for (key, value) in &target {
            match current.get(key) {
                None => diff.added.push(key.clone()),
                Some(existing) if existing != value => diff.modified.push(key.clone()),
                Some(_) => {}
            }
        }
        diff.removed = current
            .keys()
            .filter(|k| !target.contains_key(*k))
            .cloned()
            .collect();
        diff
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.removed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.added.len() + self.modified.len() + self.removed.len()
    }

    /// `+ key`, `~ key`, `- key` lines, at most `limit` per group.
    pub fn summary(&self, limit: usize) -> Vec<String> {
        let mut lines = Vec::new();
        for (marker, label, keys) in [
            ('+', "to add", &self.added),
            ('~', "to modify", &self.modified),
            ('-', "to remove", &self.removed),
        ] {
            if keys.is_empty() {
                continue;
            }
            lines.push(format!("{} settings {}", keys.len(), label));
            for key in keys.iter().take(limit) {
                lines.push(format!("  {} {}", marker, key));
            }
            if keys.len() > limit {
                lines.push(format!("  ... and {} more", keys.len() - limit));
            }
        }
        lines
    }
}

/// Flatten nested objects into dotted keys, sorted. Arrays are leaves.
pub fn flatten(map: &Map<String, Value>) -> BTreeMap<String, Value> {
    fn walk(map: &Map<String, Value>, prefix: &str, out: &mut BTreeMap<String, Value>) {
        for (key, value) in map {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", prefix, key)
            };
            match value {
                Value::Object(inner) if !inner.is_empty() => walk(inner, &path, out),
                other => {
                    out.insert(path, other.clone());
                }
            }
        }
    }

    let mut out = BTreeMap::new();
    walk(map, "", &mut out);
    out
}

/// Read an editor's settings.json; a missing file reads as `{}`.
pub(crate) fn read_live_settings(
    fs: &dyn Filesystem,
    path: &Path,
) -> Result<Map<String, Value>> {
    if !fs.is_file(path) {
        return Ok(Map::new());
    }
    jsonc::read_object(fs, path)
}

pub fn settings_status(
    fs: &dyn Filesystem,
    live: &Path,
    target: &Map<String, Value>,
) -> (SyncStatus, SettingsDiff) {
    let current = match read_live_settings(fs, live) {
        Ok(current) => current,
        Err(e) => {
            tracing::warn!("cannot compare settings: {}", e);
            return (SyncStatus::Unknown, SettingsDiff::default());
        }
    };
    let diff = SettingsDiff::compute(&current, target);
    if current == *target {
        (SyncStatus::InSync, diff)
    } else {
        (SyncStatus::OutOfSync, diff)
    }
}

pub fn keybindings_status(fs: &dyn Filesystem, live: &Path, target: Option<&Path>) -> SyncStatus {
    match (target, fs.is_file(live)) {
        (None, true) => SyncStatus::Extra,
        (None, false) => SyncStatus::InSync,
        (Some(_), false) => SyncStatus::Missing,
        (Some(target), true) => {
            match (fs.read_to_string(live), fs.read_to_string(target)) {
                (Ok(a), Ok(b)) if a.trim() == b.trim() => SyncStatus::InSync,
                (Ok(_), Ok(_)) => SyncStatus::OutOfSync,
                _ => SyncStatus::Unknown,
            }
        }
    }
}

/// `*.code-snippets` files by name with trimmed contents. Later
/// directories replace same-named files from earlier ones.
fn snippet_contents(fs: &dyn Filesystem, dirs: &[PathBuf]) -> BTreeMap<String, String> {
    let mut files = BTreeMap::new();
    for dir in dirs.iter().filter(|d| fs.is_dir(d)) {
        let Ok(entries) = fs.list_dir(dir) else {
            continue;
        };
        for path in entries {
            let is_snippet = path.extension().is_some_and(|e| e == "code-snippets");
            if !is_snippet || !fs.is_file(&path) {
                continue;
            }
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let contents = fs.read_to_string(&path).unwrap_or_default();
            files.insert(name, contents.trim().to_string());
        }
    }
    files
}

pub fn snippets_status(fs: &dyn Filesystem, live_dir: &Path, targets: &[PathBuf]) -> SyncStatus {
    let target = snippet_contents(fs, targets);
    let current = snippet_contents(fs, &[live_dir.to_path_buf()]);
    if target == current {
        SyncStatus::InSync
    } else if target.is_empty() {
        SyncStatus::Extra
    } else {
        SyncStatus::OutOfSync
    }
}

/// Extension comparison. Identifiers compare case-insensitively.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtensionsStatus {
    pub status: Option<SyncStatus>,
    /// Targeted but not installed.
    pub missing: Vec<String>,
    /// Installed but not targeted.
    pub extra: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn extensions_status(manager: &dyn ExtensionManager, target: &[String]) -> ExtensionsStatus {
    if target.is_empty() {
        return ExtensionsStatus {
            status: Some(SyncStatus::InSync),
            ..Default::default()
        };
    }
    let installed = match manager.list_installed() {
        Ok(installed) => installed,
        Err(e) => {
            tracing::warn!("cannot list installed extensions: {}", e);
            return ExtensionsStatus {
                status: Some(SyncStatus::Unknown),
                error: Some(e.to_string()),
                ..Default::default()
            };
        }
    };

    let lower = |ids: &[String]| -> BTreeSet<String> {
        ids.iter().map(|e| e.to_lowercase()).collect()
    };
    let installed_set = lower(&installed);
    let target_set = lower(target);

    let missing: Vec<String> = target
        .iter()
        .filter(|e| !installed_set.contains(&e.to_lowercase()))
        .cloned()
        .collect();
    let extra: Vec<String> = installed
        .iter()
        .filter(|e| !target_set.contains(&e.to_lowercase()))
        .cloned()
        .collect();
    let status = if missing.is_empty() && extra.is_empty() {
        SyncStatus::InSync
    } else {
        SyncStatus::OutOfSync
    };
    ExtensionsStatus {
        status: Some(status),
        missing,
        extra,
        error: None,
    }
}

/// Status of one registered app.
#[derive(Debug, Clone, Serialize)]
pub struct AppStatus {
    pub app: String,
    pub config_path: PathBuf,
    pub overall: SyncStatus,
    pub settings: SyncStatus,
    pub settings_diff: SettingsDiff,
    pub keybindings: SyncStatus,
    pub snippets: SyncStatus,
    pub extensions: ExtensionsStatus,
    pub layers_applied: Vec<String>,
    pub skipped: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AppStatus {
    /// Compare an app's live directory against a merge result.
    pub fn compare(
        fs: &dyn Filesystem,
        app: &AppDetails,
        merge: &MergeResult,
        manager: &dyn ExtensionManager,
    ) -> Self {
        let dir = &app.config_path;
        let (settings, settings_diff) =
            settings_status(fs, &dir.join("settings.json"), &merge.merged_settings);
        let keybindings = keybindings_status(
            fs,
            &dir.join("keybindings.json"),
            merge.keybindings_source.as_deref(),
        );
        let snippets = snippets_status(fs, &dir.join("snippets"), &merge.snippets_paths);
        let extensions = extensions_status(manager, &merge.extensions);
        let extensions_state = extensions.status.unwrap_or(SyncStatus::Unknown);

        Self {
            app: app.alias.clone(),
            config_path: dir.clone(),
            overall: overall(&[settings, keybindings, snippets, extensions_state]),
            settings,
            settings_diff,
            keybindings,
            snippets,
            extensions,
            layers_applied: merge.layers_applied.iter().map(|l| l.label()).collect(),
            skipped: merge.skipped.iter().map(|s| s.to_string()).collect(),
            error: None,
        }
    }

    fn failed(app: &AppDetails, error: String) -> Self {
        Self {
            app: app.alias.clone(),
            config_path: app.config_path.clone(),
            overall: SyncStatus::Unknown,
            settings: SyncStatus::Unknown,
            settings_diff: SettingsDiff::default(),
            keybindings: SyncStatus::Unknown,
            snippets: SyncStatus::Unknown,
            extensions: ExtensionsStatus::default(),
            layers_applied: Vec::new(),
            skipped: Vec::new(),
            error: Some(error),
        }
    }
}

/// Status of one or all registered apps.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub apps: Vec<AppStatus>,
}

impl Output for StatusReport {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.apps.is_empty() {
            return "No applications registered. Use 'vsc-sync add-app' or 'vsc-sync discover --add'."
                .to_string();
        }

        let mut lines = Vec::new();
        for app in &self.apps {
            lines.push(format!("{}: {}", app.app, app.overall));
            if let Some(ref error) = app.error {
                lines.push(format!("  error: {}", error));
                continue;
            }
            if !app.layers_applied.is_empty() {
                lines.push(format!("  layers: {}", app.layers_applied.join(" -> ")));
            }
            for skipped in &app.skipped {
                lines.push(format!("  warning: {}", skipped));
            }
            lines.push(format!("  settings:    {}", app.settings));
            if !app.settings_diff.is_empty() {
                let summary = app.settings_diff.summary(3).join("\n");
                lines.push(indent(&summary, "    "));
            }
            lines.push(format!("  keybindings: {}", app.keybindings));
            lines.push(format!("  snippets:    {}", app.snippets));
            let ext = &app.extensions;
            lines.push(format!(
                "  extensions:  {}",
                ext.status.unwrap_or(SyncStatus::Unknown)
            ));
            if !ext.missing.is_empty() {
                lines.push(format!("    not installed: {}", ext.missing.join(", ")));
            }
            if !ext.extra.is_empty() {
                lines.push(format!("    not in layers: {}", ext.extra.join(", ")));
            }
            if let Some(ref error) = ext.error {
                lines.push(format!("    {}", error));
            }
            if app.overall == SyncStatus::OutOfSync {
                lines.push(format!("  run 'vsc-sync apply {}' to sync", app.app));
            }
        }
        lines.join("\n")
    }
}

/// Check one app, or every registered app when `alias` is `None`.
///
/// For a single app, failures (unregistered alias, missing config
/// directory, missing base layer) are returned. When checking all apps
/// they are recorded per app.
pub fn status(
    ctx: &Context,
    alias: Option<&str>,
    stacks: &[String],
    managers: &dyn Fn(&AppDetails) -> Box<dyn ExtensionManager>,
) -> Result<StatusReport> {
    let fs = OsFilesystem;

    if let Some(alias) = alias {
        let app = ctx.installed_app(alias)?;
        let merge = ctx.open_repo()?.merge_layers(Some(alias), stacks)?;
        let manager = managers(app);
        return Ok(StatusReport {
            apps: vec![AppStatus::compare(&fs, app, &merge, manager.as_ref())],
        });
    }

    let repo = ctx.open_repo();
    let apps = ctx
        .config
        .apps
        .values()
        .map(|app| {
            if !app.config_path.is_dir() {
                let missing = Error::AppConfigPath(app.config_path.clone());
                return AppStatus::failed(app, missing.to_string());
            }
            let merge = repo
                .as_ref()
                .map_err(|e| e.to_string())
                .and_then(|r| {
                    r.merge_layers(Some(&app.alias), stacks)
                        .map_err(|e| e.to_string())
                });
            match merge {
                Ok(merge) => {
                    let manager = managers(app);
                    AppStatus::compare(&fs, app, &merge, manager.as_ref())
                }
                Err(e) => AppStatus::failed(app, e),
            }
        })
        .collect();
    Ok(StatusReport { apps })
}
