//! Per-artifact collection across resolved layers.
//!
//! A layer that lacks an artifact contributes nothing. A layer whose
//! artifact cannot be parsed also contributes nothing; the problem is
//! logged and collection continues with the remaining layers.

use super::layer::{Artifact, Layer};
use crate::fs::Filesystem;
use crate::jsonc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::PathBuf;

/// The `extensions.json` document.
///
/// Unknown fields such as `unwantedRecommendations` are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionsFile {
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// Load each layer's `settings.json` object, in layer order.
pub fn layer_settings(fs: &dyn Filesystem, layers: &[Layer]) -> Vec<Map<String, Value>> {
    layers
        .iter()
        .filter_map(|layer| {
            let path = layer.artifact(Artifact::Settings);
            if !fs.is_file(&path) {
                return None;
            }
            match jsonc::read_object(fs, &path) {
                Ok(settings) => Some(settings),
                Err(e) => {
                    tracing::warn!(layer = %layer.label(), "ignoring settings: {}", e);
                    None
                }
            }
        })
        .collect()
}

/// Concatenate every layer's recommendations, keeping first occurrences.
pub fn collect_extensions(fs: &dyn Filesystem, layers: &[Layer]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut result = Vec::new();

    for layer in layers {
        let path = layer.artifact(Artifact::Extensions);
        if !fs.is_file(&path) {
            continue;
        }
        let parsed = fs.read_to_string(&path).and_then(|text| {
            let value = jsonc::parse_value(&text).map_err(|e| e.at(&path))?;
            Ok(serde_json::from_value::<ExtensionsFile>(value)?)
        });
        match parsed {
            Ok(file) => {
                for id in file.recommendations {
                    if seen.insert(id.clone()) {
                        result.push(id);
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    layer = %layer.label(),
                    path = %path.display(),
                    "failed to load extensions: {}",
                    e
                );
            }
        }
    }

    result
}

/// Path of the artifact in the highest-precedence layer that has it.
pub fn select_winner(
    fs: &dyn Filesystem,
    layers: &[Layer],
    artifact: Artifact,
) -> Option<PathBuf> {
    layers
        .iter()
        .rev()
        .map(|layer| layer.artifact(artifact))
        .find(|path| fs.exists(path))
}

/// Every layer's `snippets/` directory, in layer order.
pub fn collect_snippets(fs: &dyn Filesystem, layers: &[Layer]) -> Vec<PathBuf> {
    layers
        .iter()
        .map(|layer| layer.artifact(Artifact::Snippets))
        .filter(|path| fs.is_dir(path))
        .collect()
}
