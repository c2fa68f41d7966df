//! Layered configuration repository.
//!
//! A repository holds `base/`, `apps/<alias>/`, `stacks/<name>/` and
//! `projects/<type>/` directories, each optionally containing
//! `settings.json`, `keybindings.json`, `extensions.json`, `tasks.json`
//! and a `snippets/` directory. Merging a set of layers yields a
//! [`MergeResult`]:
//!
//! - settings are deep-merged in precedence order
//! - extension recommendations are concatenated and deduplicated
//! - keybindings and tasks come from the most specific layer defining them
//! - snippet directories are listed from every layer

pub mod collect;
pub mod layer;
pub mod merge;
pub mod resolver;

pub use collect::ExtensionsFile;
pub use layer::{Artifact, Layer, LayerType, SkippedLayer};
pub use resolver::Resolution;

use crate::fs::{Filesystem, OsFilesystem};
use crate::{Error, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};

/// Everything needed to materialise a set of layers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MergeResult {
    pub merged_settings: Map<String, Value>,
    pub keybindings_source: Option<PathBuf>,
    pub tasks_source: Option<PathBuf>,
    pub extensions: Vec<String>,
    pub snippets_paths: Vec<PathBuf>,
    pub layers_applied: Vec<Layer>,
    pub skipped: Vec<SkippedLayer>,
}

/// A layer repository rooted at a directory.
pub struct LayerRepo {
    root: PathBuf,
    fs: Box<dyn Filesystem>,
}

impl fmt::Debug for LayerRepo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerRepo").field("root", &self.root).finish()
    }
}

impl LayerRepo {
    /// Open a repository on the host filesystem.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        Self::with_filesystem(root, Box::new(OsFilesystem))
    }

    /// Open a repository through a custom filesystem.
    pub fn with_filesystem(root: impl Into<PathBuf>, fs: Box<dyn Filesystem>) -> Result<Self> {
        let root = root.into();
        if !fs.is_dir(&root) {
            return Err(Error::ConfigNotFound(root));
        }
        Ok(Self { root, fs })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn fs(&self) -> &dyn Filesystem {
        self.fs.as_ref()
    }

    /// Merge base, the app layer and stacks.
    ///
    /// Missing app or stack layers are skipped; a missing base is an error.
    pub fn merge_layers(
        &self,
        app_alias: Option<&str>,
        stacks: &[String],
    ) -> Result<MergeResult> {
        let resolution = self.resolve(app_alias, stacks)?;
        if let Some(base) = resolution.layers.first() {
            if !self.fs.is_dir(&base.path) {
                return Err(Error::ConfigNotFound(base.path.clone()));
            }
        }
        Ok(self.merge_resolved(resolution))
    }

    /// Merge a project layer and stacks; every named layer must exist.
    pub fn merge_project_layers(
        &self,
        project_type: Option<&str>,
        stacks: &[String],
    ) -> Result<MergeResult> {
        let layers = self.resolve_project(project_type, stacks)?;
        Ok(self.merge_resolved(Resolution {
            layers,
            skipped: Vec::new(),
        }))
    }

    /// Combine already-resolved layers.
    pub fn merge_resolved(&self, resolution: Resolution) -> MergeResult {
        let fs = self.fs();
        let layers = &resolution.layers;
        let settings = collect::layer_settings(fs, layers);

        let result = MergeResult {
            merged_settings: merge::merge_all(settings.iter()),
            keybindings_source: collect::select_winner(fs, layers, Artifact::Keybindings),
            tasks_source: collect::select_winner(fs, layers, Artifact::Tasks),
            extensions: collect::collect_extensions(fs, layers),
            snippets_paths: collect::collect_snippets(fs, layers),
            layers_applied: resolution.layers,
            skipped: resolution.skipped,
        };
        tracing::debug!(
            layers = result.layers_applied.len(),
            settings = result.merged_settings.len(),
            extensions = result.extensions.len(),
            "merged layers"
        );
        result
    }
}
