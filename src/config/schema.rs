//! KDL schema for vsc-sync's own `config.kdl`.
//!
//! # KDL Schema
//!
//! ```kdl
//! repo "/home/me/vscode-configs"
//! default-editor "code"
//! app "vscode" {
//!     config-path "/home/me/.config/Code/User"
//!     executable "/usr/bin/code"
//! }
//! ```

use crate::apps::AppDetails;
use crate::{Error, Result};
use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Settings for the vsc-sync tool itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VscSyncConfig {
    /// Root of the layer repository.
    pub repo: Option<PathBuf>,

    /// Editor command used by `edit` (e.g. "code", "nvim").
    pub default_editor: Option<String>,

    /// Registered editors, keyed by alias.
    pub apps: BTreeMap<String, AppDetails>,
}

impl VscSyncConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse config from a KDL document.
    ///
    /// Unknown nodes are ignored. An `app` block without a name or without
    /// `config-path` is an error.
    pub fn from_kdl(doc: &KdlDocument) -> std::result::Result<Self, String> {
        let mut config = Self::new();

        if let Some(repo) = doc.get("repo").and_then(get_string_arg) {
            config.repo = Some(PathBuf::from(repo));
        }
        config.default_editor = doc.get("default-editor").and_then(get_string_arg);

        for node in doc.nodes() {
            if node.name().value() == "app" {
                let app = parse_app_node(node)?;
                config.apps.insert(app.alias.clone(), app);
            }
        }

        Ok(config)
    }

    /// Convert config to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        if let Some(ref repo) = self.repo {
            doc.nodes_mut()
                .push(string_node("repo", &repo.to_string_lossy()));
        }

        if let Some(ref editor) = self.default_editor {
            doc.nodes_mut().push(string_node("default-editor", editor));
        }

        for app in self.apps.values() {
            let mut node = KdlNode::new("app");
            node.push(KdlEntry::new(KdlValue::String(app.alias.clone())));

            let mut children = KdlDocument::new();
            children
                .nodes_mut()
                .push(string_node("config-path", &app.config_path.to_string_lossy()));
            if let Some(ref exe) = app.executable_path {
                children
                    .nodes_mut()
                    .push(string_node("executable", &exe.to_string_lossy()));
            }
            node.set_children(children);
            doc.nodes_mut().push(node);
        }

        doc
    }

    /// Render the config as formatted KDL text.
    pub fn to_kdl_string(&self) -> String {
        let mut doc = self.to_kdl();
        doc.autoformat();
        doc.to_string()
    }

    /// Look up a registered app.
    pub fn app(&self, alias: &str) -> Result<&AppDetails> {
        self.apps.get(alias).ok_or_else(|| Error::AppNotRegistered {
            alias: alias.to_string(),
            available: self.available_apps(),
        })
    }

    /// Comma-separated registered aliases, or "none".
    pub fn available_apps(&self) -> String {
        if self.apps.is_empty() {
            "none".to_string()
        } else {
            self.apps.keys().cloned().collect::<Vec<_>>().join(", ")
        }
    }

    /// Add or replace an app registration.
    pub fn register_app(&mut self, app: AppDetails) -> Option<AppDetails> {
        self.apps.insert(app.alias.clone(), app)
    }
}

fn string_node(name: &str, value: &str) -> KdlNode {
    let mut node = KdlNode::new(name);
    node.push(KdlEntry::new(KdlValue::String(value.to_string())));
    node
}

/// Get a string argument from a node's first entry.
fn get_string_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .first()
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

fn parse_app_node(node: &KdlNode) -> std::result::Result<AppDetails, String> {
    let alias = get_string_arg(node).ok_or("app node must have an alias argument")?;

    let mut config_path = None;
    let mut executable = None;
    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "config-path" => config_path = get_string_arg(child).map(PathBuf::from),
                "executable" => executable = get_string_arg(child).map(PathBuf::from),
                other => {
                    tracing::debug!(app = %alias, "ignoring unknown app field '{}'", other)
                }
            }
        }
    }

    let config_path =
        config_path.ok_or_else(|| format!("app '{}' is missing config-path", alias))?;
    Ok(AppDetails {
        alias,
        config_path,
        executable_path: executable,
    })
}
