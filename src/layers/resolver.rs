//! Layer resolution.
//!
//! Precedence, lowest to highest:
//! 1. `base/` (always present in the result, even if missing on disk)
//! 2. `apps/<alias>/`
//! 3. `stacks/<name>/` for each stack, in the order given
//!
//! Named layers that do not exist are skipped and reported. Stacks are
//! neither reordered nor deduplicated: naming a stack twice applies it twice.

use super::layer::{Layer, LayerType, SkippedLayer, validate_layer_name};
use super::LayerRepo;
use crate::{Error, Result};
use serde::Serialize;
use std::path::PathBuf;

/// Ordered layers plus the named layers that were not found.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Resolution {
    pub layers: Vec<Layer>,
    pub skipped: Vec<SkippedLayer>,
}

impl LayerRepo {
    /// Directory of a layer. Base ignores the name; other types require one.
    pub fn layer_path(&self, layer_type: LayerType, name: Option<&str>) -> Result<PathBuf> {
        let dir = self.root().join(layer_type.dir_name());
        if !layer_type.requires_name() {
            return Ok(dir);
        }
        let name = name.ok_or_else(|| {
            Error::InvalidLayer(format!("a name is required for {} layers", layer_type))
        })?;
        validate_layer_name(layer_type, name)?;
        Ok(dir.join(name))
    }

    /// Build the layer reference without checking existence.
    pub fn layer(&self, layer_type: LayerType, name: Option<&str>) -> Result<Layer> {
        let path = self.layer_path(layer_type, name)?;
        Ok(Layer {
            layer_type,
            layer_name: if layer_type.requires_name() {
                name.map(String::from)
            } else {
                None
            },
            path,
        })
    }

    /// Whether the layer directory exists. Invalid references never exist.
    pub fn layer_exists(&self, layer_type: LayerType, name: Option<&str>) -> bool {
        self.layer_path(layer_type, name)
            .map(|path| self.fs().is_dir(&path))
            .unwrap_or(false)
    }

    /// Names of the existing layers of a named type, sorted.
    pub fn list_layers(&self, layer_type: LayerType) -> Result<Vec<String>> {
        let dir = self.root().join(layer_type.dir_name());
        if !layer_type.requires_name() || !self.fs().is_dir(&dir) {
            return Ok(Vec::new());
        }
        let names = self
            .fs()
            .list_dir(&dir)?
            .into_iter()
            .filter(|p| self.fs().is_dir(p))
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
            .collect();
        Ok(names)
    }

    /// Resolve base, the optional app layer and the stacks.
    ///
    /// Base is always first whether or not it exists on disk; callers that
    /// need it check `layers[0].path` themselves.
    pub fn resolve(&self, app_alias: Option<&str>, stacks: &[String]) -> Result<Resolution> {
        let mut resolution = Resolution {
            layers: vec![self.layer(LayerType::Base, None)?],
            skipped: Vec::new(),
        };

        let named = app_alias
            .map(|alias| (LayerType::App, alias))
            .into_iter()
            .chain(stacks.iter().map(|s| (LayerType::Stack, s.as_str())));

        for (layer_type, name) in named {
            let layer = self.layer(layer_type, Some(name))?;
            if self.fs().is_dir(&layer.path) {
                resolution.layers.push(layer);
            } else {
                let skipped = SkippedLayer {
                    layer_type,
                    layer_name: name.to_string(),
                    path: layer.path,
                };
                tracing::warn!("{}", skipped);
                resolution.skipped.push(skipped);
            }
        }

        Ok(resolution)
    }

    /// Resolve layers for a project directory: `projects/<type>` then stacks.
    ///
    /// Unlike [`resolve`](Self::resolve), a missing named layer is an error
    /// and at least one layer must be requested.
    pub fn resolve_project(
        &self,
        project_type: Option<&str>,
        stacks: &[String],
    ) -> Result<Vec<Layer>> {
        let named = project_type
            .map(|p| (LayerType::Project, p))
            .into_iter()
            .chain(stacks.iter().map(|s| (LayerType::Stack, s.as_str())));

        let mut layers = Vec::new();
        for (layer_type, name) in named {
            let layer = self.layer(layer_type, Some(name))?;
            if !self.fs().is_dir(&layer.path) {
                return Err(Error::LayerNotFound {
                    layer: layer.label(),
                    path: layer.path,
                });
            }
            layers.push(layer);
        }

        if layers.is_empty() {
            return Err(Error::InvalidInput(
                "at least one project type or stack is required".to_string(),
            ));
        }
        Ok(layers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestRepo;

    fn stacks(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_layer_path() {
        let env = TestRepo::new();
        let repo = env.open();

        assert_eq!(
            repo.layer_path(LayerType::Base, None).unwrap(),
            env.path().join("base")
        );
        assert_eq!(
            repo.layer_path(LayerType::Stack, Some("python")).unwrap(),
            env.path().join("stacks/python")
        );
        assert!(matches!(
            repo.layer_path(LayerType::App, None),
            Err(Error::InvalidLayer(_))
        ));
    }

    #[test]
    fn test_resolve_order() {
        let env = TestRepo::new();
        env.layer(LayerType::App, Some("vscode"));
        env.layer(LayerType::Stack, Some("python"));
        env.layer(LayerType::Stack, Some("web"));
        let repo = env.open();

        let resolution = repo
            .resolve(Some("vscode"), &stacks(&["web", "python"]))
            .unwrap();

        let labels: Vec<_> = resolution.layers.iter().map(|l| l.label()).collect();
        assert_eq!(labels, vec!["base", "app:vscode", "stack:web", "stack:python"]);
        assert!(resolution.skipped.is_empty());
    }

    #[test]
    fn test_resolve_skips_missing_named_layers() {
        let env = TestRepo::new();
        env.layer(LayerType::Stack, Some("python"));
        let repo = env.open();

        let resolution = repo
            .resolve(Some("cursor"), &stacks(&["rust", "python"]))
            .unwrap();

        let labels: Vec<_> = resolution.layers.iter().map(|l| l.label()).collect();
        assert_eq!(labels, vec!["base", "stack:python"]);
        let skipped: Vec<_> = resolution.skipped.iter().map(|s| s.to_string()).collect();
        assert_eq!(
            skipped,
            vec![
                "App layer 'cursor' not found, skipping",
                "Stack layer 'rust' not found, skipping"
            ]
        );
    }

    #[test]
    fn test_resolve_includes_missing_base() {
        let env = TestRepo::bare();
        let repo = env.open();

        let resolution = repo.resolve(None, &[]).unwrap();

        assert_eq!(resolution.layers.len(), 1);
        assert_eq!(resolution.layers[0].layer_type, LayerType::Base);
        assert!(!resolution.layers[0].path.exists());
    }

    #[test]
    fn test_resolve_keeps_duplicate_stacks() {
        let env = TestRepo::new();
        env.layer(LayerType::Stack, Some("python"));
        let repo = env.open();

        let resolution = repo
            .resolve(None, &stacks(&["python", "python"]))
            .unwrap();
        assert_eq!(resolution.layers.len(), 3);
    }

    #[test]
    fn test_resolve_rejects_invalid_name() {
        let env = TestRepo::new();
        let repo = env.open();
        assert!(matches!(
            repo.resolve(None, &stacks(&["../base"])),
            Err(Error::InvalidLayer(_))
        ));
    }

    #[test]
    fn test_resolve_project_strict() {
        let env = TestRepo::new();
        env.layer(LayerType::Project, Some("django"));
        let repo = env.open();

        let layers = repo.resolve_project(Some("django"), &[]).unwrap();
        assert_eq!(layers[0].label(), "project:django");

        let err = repo
            .resolve_project(Some("django"), &stacks(&["missing"]))
            .unwrap_err();
        assert!(matches!(err, Error::LayerNotFound { .. }));
        assert!(err.to_string().contains("stack:missing"));
    }

    #[test]
    fn test_resolve_project_requires_a_layer() {
        let env = TestRepo::new();
        let repo = env.open();
        assert!(matches!(
            repo.resolve_project(None, &[]),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_list_layers() {
        let env = TestRepo::new();
        env.layer(LayerType::Stack, Some("web"));
        env.layer(LayerType::Stack, Some("python"));
        env.write("stacks/README.md", "not a layer");
        let repo = env.open();

        assert_eq!(repo.list_layers(LayerType::Stack).unwrap(), vec!["python", "web"]);
        assert!(repo.list_layers(LayerType::Project).unwrap().is_empty());
        assert!(repo.list_layers(LayerType::Base).unwrap().is_empty());
    }

    #[test]
    fn test_layer_exists() {
        let env = TestRepo::new();
        env.layer(LayerType::App, Some("vscode"));
        let repo = env.open();

        assert!(repo.layer_exists(LayerType::Base, None));
        assert!(repo.layer_exists(LayerType::App, Some("vscode")));
        assert!(!repo.layer_exists(LayerType::App, Some("cursor")));
        assert!(!repo.layer_exists(LayerType::App, None));
    }
}
