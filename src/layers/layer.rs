//! Layer identities and the artifacts a layer can carry.

use crate::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// The kind of a configuration layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerType {
    Base,
    App,
    Stack,
    Project,
}

impl LayerType {
    /// All layer types in precedence order.
    pub const ALL: [LayerType; 4] = [Self::Base, Self::App, Self::Stack, Self::Project];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::App => "app",
            Self::Stack => "stack",
            Self::Project => "project",
        }
    }

    /// Directory under the repository root holding layers of this type.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::App => "apps",
            Self::Stack => "stacks",
            Self::Project => "projects",
        }
    }

    /// Every type except base must be given a layer name.
    pub fn requires_name(&self) -> bool {
        !matches!(self, Self::Base)
    }

    fn title(&self) -> &'static str {
        match self {
            Self::Base => "Base",
            Self::App => "App",
            Self::Stack => "Stack",
            Self::Project => "Project",
        }
    }
}

impl fmt::Display for LayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayerType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "base" => Ok(Self::Base),
            "app" | "apps" => Ok(Self::App),
            "stack" | "stacks" => Ok(Self::Stack),
            "project" | "projects" => Ok(Self::Project),
            other => Err(Error::InvalidLayer(format!(
                "unknown layer type '{}' (expected base, app, stack or project)",
                other
            ))),
        }
    }
}

/// A resolved layer: its identity plus the directory it lives in.
///
/// The directory is not guaranteed to exist; see [`super::LayerRepo::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layer {
    pub layer_type: LayerType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer_name: Option<String>,
    pub path: PathBuf,
}

impl Layer {
    /// Short label such as `base` or `stack:python`.
    pub fn label(&self) -> String {
        match &self.layer_name {
            Some(name) => format!("{}:{}", self.layer_type, name),
            None => self.layer_type.to_string(),
        }
    }

    /// Path of an artifact inside this layer.
    pub fn artifact(&self, artifact: Artifact) -> PathBuf {
        self.path.join(artifact.file_name())
    }
}

/// A layer referenced by name whose directory does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedLayer {
    pub layer_type: LayerType,
    pub layer_name: String,
    pub path: PathBuf,
}

impl fmt::Display for SkippedLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} layer '{}' not found, skipping",
            self.layer_type.title(),
            self.layer_name
        )
    }
}

/// The files and directories a layer (or an editor's user dir) can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Artifact {
    Settings,
    Keybindings,
    Extensions,
    Tasks,
    Snippets,
}

impl Artifact {
    pub const ALL: [Artifact; 5] = [
        Self::Settings,
        Self::Keybindings,
        Self::Extensions,
        Self::Tasks,
        Self::Snippets,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Settings => "settings",
            Self::Keybindings => "keybindings",
            Self::Extensions => "extensions",
            Self::Tasks => "tasks",
            Self::Snippets => "snippets",
        }
    }

    /// File (or directory) name inside a layer.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Settings => "settings.json",
            Self::Keybindings => "keybindings.json",
            Self::Extensions => "extensions.json",
            Self::Tasks => "tasks.json",
            Self::Snippets => "snippets",
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Snippets)
    }

    /// Content written when `edit` creates a missing file.
    pub fn initial_content(&self) -> Option<&'static str> {
        match self {
            Self::Settings => Some("{\n}\n"),
            Self::Keybindings => Some("[\n]\n"),
            Self::Extensions => Some("{\n  \"recommendations\": []\n}\n"),
            Self::Tasks => Some("{\n  \"version\": \"2.0.0\",\n  \"tasks\": []\n}\n"),
            Self::Snippets => None,
        }
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Artifact {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim_end_matches(".json");
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == trimmed)
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "unknown file type '{}' (expected settings, keybindings, extensions, tasks or snippets)",
                    s
                ))
            })
    }
}

/// Reject names that would escape the layer directory.
pub(crate) fn validate_layer_name(layer_type: LayerType, name: &str) -> Result<()> {
    let path = Path::new(name);
    let single_component = path.components().count() == 1
        && path
            .components()
            .all(|c| matches!(c, std::path::Component::Normal(_)));
    if name.trim().is_empty() || !single_component {
        return Err(Error::InvalidLayer(format!(
            "invalid {} layer name '{}'",
            layer_type, name
        )));
    }
    Ok(())
}
