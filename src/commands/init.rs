//! `vsc-sync init`: create the layer repository and config.kdl.

use super::{Context, Output, Prompt, json};
use crate::apps::AppDetails;
use crate::config::expand_tilde;
use crate::fs::{Filesystem, OsFilesystem, render_json};
use crate::layers::{Artifact, LayerType};
use crate::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

const README: &str = "# VSCode Configurations

This repository contains your synchronized VSCode-like editor configurations.

## Structure

- `base/`: Base configurations applied to all editors
- `apps/`: Editor-specific configurations
- `stacks/`: Technology stack-specific configurations
- `projects/`: Project template configurations

## Usage

Use the `vsc-sync` CLI tool to apply these configurations to your editors.
";

#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Repository location; defaults to the resolved repo path.
    pub repo: Option<PathBuf>,
    /// Reinitialize without asking.
    pub force: bool,
    /// Skip auto-discovery of installed editors.
    pub no_discover: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct InitResult {
    pub config_path: PathBuf,
    pub repo: PathBuf,
    pub cancelled: bool,
    pub reinitialized: bool,
    /// Files and directories created in the repository.
    pub created: Vec<PathBuf>,
    /// Newly registered apps.
    pub discovered: Vec<String>,
    pub apps: Vec<String>,
}

impl Output for InitResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.cancelled {
            return "Initialization cancelled.".to_string();
        }
        let mut lines = vec![
            format!("Initialized vsc-sync at {}", self.config_path.display()),
            format!("  repository: {}", self.repo.display()),
        ];
        if !self.created.is_empty() {
            lines.push(format!("  created {} repository entries", self.created.len()));
        }
        if self.discovered.is_empty() {
            lines.push("  no new editors discovered".to_string());
        } else {
            lines.push(format!("  discovered: {}", self.discovered.join(", ")));
        }
        if !self.created.is_empty() {
            lines.push(String::new());
            lines.push("Tip: initialize the repository with git:".to_string());
            lines.push(format!("  cd {} && git init", self.repo.display()));
        }
        lines.join("\n")
    }
}

/// Create the repository layout. Existing files are never replaced.
pub fn create_repo_structure(repo: &Path) -> Result<Vec<PathBuf>> {
    let fs = OsFilesystem;
    let mut created = Vec::new();

    let base = repo.join(LayerType::Base.dir_name());
    let dirs = LayerType::ALL
        .iter()
        .map(|t| repo.join(t.dir_name()))
        .chain(std::iter::once(base.join(Artifact::Snippets.file_name())));
    for dir in dirs {
        if !dir.is_dir() {
            std::fs::create_dir_all(&dir)?;
            created.push(dir);
        }
    }

    let settings = serde_json::json!({
        "editor.fontSize": 14,
        "editor.tabSize": 2,
        "editor.insertSpaces": true,
        "files.autoSave": "onFocusChange",
    });
    let files = [
        (base.join(Artifact::Settings.file_name()), render_json(&settings)?),
        (
            base.join(Artifact::Extensions.file_name()),
            render_json(&serde_json::json!({"recommendations": []}))?,
        ),
        (base.join(Artifact::Keybindings.file_name()), render_json(&serde_json::json!([]))?),
        (repo.join("README.md"), README.to_string()),
    ];
    for (path, contents) in files {
        if !path.exists() {
            fs.write(&path, &contents)?;
            created.push(path);
        }
    }

    tracing::debug!(repo = %repo.display(), created = created.len(), "repository structure");
    Ok(created)
}

/// Initialize vsc-sync: repository layout, discovered apps, config.kdl.
///
/// `discover` returns the editors installed on this machine.
pub fn init(
    ctx: &mut Context,
    opts: &InitOptions,
    prompt: &mut dyn Prompt,
    discover: &dyn Fn() -> Vec<AppDetails>,
) -> Result<InitResult> {
    let mut result = InitResult {
        config_path: ctx.store.path().to_path_buf(),
        ..Default::default()
    };

    if ctx.store.is_initialized() {
        if !opts.force
            && !prompt.confirm(
                "vsc-sync is already initialized. Reinitialize? This rewrites config.kdl",
                false,
            )
        {
            result.cancelled = true;
            return Ok(result);
        }
        result.reinitialized = true;
    }

    let repo = match opts.repo {
        Some(ref repo) => expand_tilde(repo),
        None => ctx.repo_path(),
    };
    let missing: Vec<&str> = [LayerType::Base, LayerType::App, LayerType::Stack]
        .iter()
        .map(|t| t.dir_name())
        .filter(|d| !repo.join(d).is_dir())
        .collect();
    if repo.is_dir() && !missing.is_empty() {
        tracing::warn!(
            repo = %repo.display(),
            "repository is missing {}; creating them",
            missing.join(", ")
        );
    }
    result.created = create_repo_structure(&repo)?;

    ctx.config.repo = Some(repo.clone());
    ctx.overrides.repo = Some(repo.clone());
    if !opts.no_discover {
        for app in discover() {
            if ctx.config.apps.contains_key(&app.alias) {
                continue;
            }
            tracing::info!(alias = %app.alias, "registering discovered app");
            result.discovered.push(app.alias.clone());
            ctx.config.register_app(app);
        }
    }
    ctx.store.save(&ctx.config)?;

    result.repo = repo;
    result.apps = ctx.config.apps.keys().cloned().collect();
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::AssumeYes;
    use crate::config::{ConfigOverrides, ConfigStore, VscSyncConfig};
    use crate::test_utils::ScriptedPrompt;
    use tempfile::TempDir;

    fn fresh(dir: &TempDir) -> Context {
        Context::new(
            ConfigStore::new(dir.path().join("config/config.kdl")),
            VscSyncConfig::new(),
            ConfigOverrides::default(),
        )
    }

    #[test]
    fn test_create_repo_structure() {
        let dir = TempDir::new().unwrap();
        let repo = dir.path().join("vscode-configs");

        let created = create_repo_structure(&repo).unwrap();

        for d in ["base", "apps", "stacks", "projects", "base/snippets"] {
            assert!(repo.join(d).is_dir(), "{d}");
        }
        let settings: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(repo.join("base/settings.json")).unwrap())
                .unwrap();
        assert_eq!(settings["files.autoSave"], "onFocusChange");
        assert_eq!(settings["editor.tabSize"], 2);
        assert_eq!(
            std::fs::read_to_string(repo.join("base/keybindings.json")).unwrap(),
            "[]\n"
        );
        assert!(repo.join("README.md").is_file());
        assert_eq!(created.len(), 9);

        // Second run keeps user edits
        std::fs::write(repo.join("base/settings.json"), "{}").unwrap();
        assert!(create_repo_structure(&repo).unwrap().is_empty());
        assert_eq!(
            std::fs::read_to_string(repo.join("base/settings.json")).unwrap(),
            "{}"
        );
    }

    #[test]
    fn test_init_saves_config() {
        let dir = TempDir::new().unwrap();
        let mut ctx = fresh(&dir);
        let repo = dir.path().join("repo");
        let user = dir.path().join("Code/User");
        std::fs::create_dir_all(&user).unwrap();
        let found = user.clone();

        let result = init(
            &mut ctx,
            &InitOptions {
                repo: Some(repo.clone()),
                ..Default::default()
            },
            &mut ScriptedPrompt::default(),
            &|| vec![AppDetails::new("vscode", found.clone())],
        )
        .unwrap();

        assert!(!result.reinitialized);
        assert_eq!(result.discovered, vec!["vscode"]);
        assert!(ctx.store.is_initialized());
        let saved = ctx.store.load().unwrap();
        assert_eq!(saved.repo, Some(repo.clone()));
        assert_eq!(saved.apps["vscode"].config_path, user);
        assert!(repo.join("base/settings.json").is_file());
        assert_eq!(ctx.open_repo().unwrap().root(), repo);
    }

    #[test]
    fn test_reinit_requires_confirmation() {
        let dir = TempDir::new().unwrap();
        let mut ctx = fresh(&dir);
        ctx.store.save(&VscSyncConfig::new()).unwrap();
        let mut prompt = ScriptedPrompt::new(&[false]);

        let result = init(&mut ctx, &InitOptions::default(), &mut prompt, &|| Vec::new()).unwrap();

        assert!(result.cancelled);
        assert_eq!(prompt.asked.len(), 1);
    }

    #[test]
    fn test_reinit_keeps_registered_apps() {
        let dir = TempDir::new().unwrap();
        let mut ctx = fresh(&dir);
        ctx.config
            .register_app(AppDetails::new("vscode", "/custom/User").with_executable("/x/code"));
        ctx.store.save(&ctx.config).unwrap();

        let result = init(
            &mut ctx,
            &InitOptions {
                repo: Some(dir.path().join("repo")),
                force: true,
                ..Default::default()
            },
            &mut AssumeYes,
            &|| vec![AppDetails::new("vscode", "/discovered/User")],
        )
        .unwrap();

        assert!(result.reinitialized);
        assert!(result.discovered.is_empty());
        assert_eq!(
            ctx.store.load().unwrap().apps["vscode"].config_path,
            PathBuf::from("/custom/User")
        );
    }

    #[test]
    fn test_no_discover() {
        let dir = TempDir::new().unwrap();
        let mut ctx = fresh(&dir);
        let result = init(
            &mut ctx,
            &InitOptions {
                repo: Some(dir.path().join("repo")),
                no_discover: true,
                ..Default::default()
            },
            &mut AssumeYes,
            &|| panic!("discovery should not run"),
        )
        .unwrap();
        assert!(result.apps.is_empty());
    }
}
