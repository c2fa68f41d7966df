//! Registering, listing and discovering editors.

use super::{Context, Output, json};
use crate::apps::{AppDetails, validate_config_path};
use crate::config::expand_tilde;
use crate::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize)]
pub struct AddAppResult {
    pub app: AppDetails,
    /// An existing registration was overwritten.
    pub replaced: bool,
    /// The directory does not look like an editor `User` directory.
    pub unrecognized: bool,
}

impl Output for AddAppResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let verb = if self.replaced { "Updated" } else { "Registered" };
        let mut out = format!(
            "{} app '{}' with config path {}",
            verb,
            self.app.alias,
            self.app.config_path.display()
        );
        if let Some(ref exe) = self.app.executable_path {
            out.push_str(&format!("\n  executable: {}", exe.display()));
        }
        if self.unrecognized {
            out.push_str("\n  warning: no settings.json, keybindings.json or snippets found there");
        }
        out
    }
}

/// Register an app. The config directory must exist.
pub fn add_app(
    ctx: &mut Context,
    alias: &str,
    config_path: &Path,
    executable: Option<&Path>,
) -> Result<AddAppResult> {
    ctx.require_initialized()?;
    if alias.trim().is_empty() || alias.contains(['/', '\\']) {
        return Err(Error::InvalidInput(format!("invalid app alias '{}'", alias)));
    }

    let config_path = expand_tilde(config_path);
    if !config_path.is_dir() {
        return Err(Error::AppConfigPath(config_path));
    }
    let unrecognized = !validate_config_path(&config_path);
    if unrecognized {
        tracing::warn!(
            path = %config_path.display(),
            "directory does not look like an editor User directory"
        );
    }

    let mut app = AppDetails::new(alias, config_path);
    if let Some(exe) = executable {
        app = app.with_executable(expand_tilde(exe));
    }
    let replaced = ctx.config.register_app(app.clone()).is_some();
    ctx.store.save(&ctx.config)?;

    Ok(AddAppResult {
        app,
        replaced,
        unrecognized,
    })
}

/// One row of `list-apps`.
#[derive(Debug, Clone, Serialize)]
pub struct AppEntry {
    #[serde(flatten)]
    pub app: AppDetails,
    pub config_exists: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppList {
    pub apps: Vec<AppEntry>,
    #[serde(skip)]
    pub verbose: bool,
}

impl Output for AppList {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.apps.is_empty() {
            return "No applications registered yet.\n\
                    Use 'vsc-sync add-app' or 'vsc-sync discover --add' to register one."
                .to_string();
        }
        let width = self.apps.iter().map(|e| e.app.alias.len()).max().unwrap_or(0);
        self.apps
            .iter()
            .map(|entry| {
                let mut line = format!(
                    "{:width$}  {}",
                    entry.app.alias,
                    entry.app.config_path.display(),
                    width = width
                );
                if self.verbose {
                    let exe = entry
                        .app
                        .executable_path
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "not set".to_string());
                    let mark = if entry.config_exists { "ok" } else { "missing" };
                    line.push_str(&format!("  {}  [{}]", exe, mark));
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn list_apps(ctx: &Context, verbose: bool) -> Result<AppList> {
    ctx.require_initialized()?;
    let apps = ctx
        .config
        .apps
        .values()
        .map(|app| AppEntry {
            config_exists: app.config_path.is_dir(),
            app: app.clone(),
        })
        .collect();
    Ok(AppList { apps, verbose })
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscoverResult {
    pub discovered: Vec<AppDetails>,
    /// Aliases written to config.kdl with `--add`.
    pub added: Vec<String>,
}

impl Output for DiscoverResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.discovered.is_empty() {
            return "No VSCode-like applications found.".to_string();
        }
        let mut lines = vec!["Discovered applications:".to_string()];
        for app in &self.discovered {
            let exe = app
                .executable_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "executable not found".to_string());
            let added = if self.added.contains(&app.alias) {
                " (added)"
            } else {
                ""
            };
            lines.push(format!(
                "  {}  {}  {}{}",
                app.alias,
                app.config_path.display(),
                exe,
                added
            ));
        }
        if self.added.is_empty() {
            lines.push("Use 'vsc-sync discover --add' to register them.".to_string());
        }
        lines.join("\n")
    }
}

/// Find installed editors; with `add`, register the ones not yet known.
pub fn discover(
    ctx: &mut Context,
    add: bool,
    finder: &dyn Fn() -> Vec<AppDetails>,
) -> Result<DiscoverResult> {
    let discovered = finder();
    let mut added = Vec::new();
    if add {
        ctx.require_initialized()?;
        for app in &discovered {
            if !ctx.config.apps.contains_key(&app.alias) {
                ctx.config.register_app(app.clone());
                added.push(app.alias.clone());
            }
        }
        if !added.is_empty() {
            ctx.store.save(&ctx.config)?;
        }
    }
    Ok(DiscoverResult { discovered, added })
}
