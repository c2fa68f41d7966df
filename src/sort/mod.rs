//! Canonical sort passes for editor config files.
//!
//! Sorting a file happens in two steps. [`plan_keybindings_sort`] and
//! [`plan_settings_sort`] read, parse and sort without touching the file;
//! [`SortPlan::write`] then replaces it. A malformed file fails the plan,
//! so nothing is ever written for it.
//!
//! The rewritten file is two-space indented JSON with a trailing newline.
//! Comments in the original are lost.

pub mod keybindings;
pub mod settings;

pub use keybindings::{count_operators, sort_key, sort_keybindings};
pub use settings::sort_settings;

use crate::fs::{Filesystem, render_json};
use crate::jsonc;
use crate::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Which kind of file a plan sorts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKind {
    Keybindings,
    Settings,
}

impl std::str::FromStr for SortKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().trim_end_matches(".json") {
            "keybindings" => Ok(Self::Keybindings),
            "settings" => Ok(Self::Settings),
            other => Err(Error::InvalidInput(format!(
                "unknown sort kind '{}' (expected keybindings or settings)",
                other
            ))),
        }
    }
}

/// A fully computed sort that has not been written yet.
#[derive(Debug, Clone, Serialize)]
pub struct SortPlan {
    pub path: PathBuf,
    pub kind: SortKind,
    /// Keybinding entries or top-level settings keys.
    pub entries: usize,
    /// Whether the rewritten text differs from the file on disk.
    pub changed: bool,
    #[serde(skip)]
    rendered: String,
}

impl SortPlan {
    /// The text that [`write`](Self::write) will put on disk.
    pub fn rendered(&self) -> &str {
        &self.rendered
    }

    /// Replace the file with the sorted text.
    pub fn write(&self, fs: &dyn Filesystem) -> Result<()> {
        fs.write(&self.path, &self.rendered)?;
        tracing::debug!(
            path = %self.path.display(),
            entries = self.entries,
            "wrote sorted file"
        );
        Ok(())
    }
}

/// Result of a one-shot sort.
#[derive(Debug, Clone, Serialize)]
pub struct SortOutcome {
    pub path: PathBuf,
    pub kind: SortKind,
    pub entries: usize,
    pub written: bool,
}

fn read_existing(fs: &dyn Filesystem, path: &Path) -> Result<String> {
    if !fs.is_file(path) {
        return Err(Error::InvalidInput(format!(
            "Cannot sort: {} does not exist",
            path.display()
        )));
    }
    fs.read_to_string(path)
}

/// Read, parse and sort a keybindings file without writing it.
pub fn plan_keybindings_sort(fs: &dyn Filesystem, path: &Path) -> Result<SortPlan> {
    let original = read_existing(fs, path)?;
    let entries = jsonc::parse_array(&original).map_err(|e| e.at(path))?;
    let sorted = sort_keybindings(entries);
    let count = sorted.len();
    let rendered = render_json(&Value::Array(sorted))?;

    Ok(SortPlan {
        path: path.to_path_buf(),
        kind: SortKind::Keybindings,
        entries: count,
        changed: rendered != original,
        rendered,
    })
}

/// Read, parse and sort a settings file without writing it.
pub fn plan_settings_sort(fs: &dyn Filesystem, path: &Path) -> Result<SortPlan> {
    let original = read_existing(fs, path)?;
    let settings = jsonc::parse_object(&original).map_err(|e| e.at(path))?;
    let sorted = sort_settings(settings);
    let count = sorted.len();
    let rendered = render_json(&Value::Object(sorted))?;

    Ok(SortPlan {
        path: path.to_path_buf(),
        kind: SortKind::Settings,
        entries: count,
        changed: rendered != original,
        rendered,
    })
}

fn finish(fs: &dyn Filesystem, plan: SortPlan, confirmed: bool) -> Result<SortOutcome> {
    if confirmed {
        plan.write(fs)?;
    }
    Ok(SortOutcome {
        path: plan.path,
        kind: plan.kind,
        entries: plan.entries,
        written: confirmed,
    })
}

/// Sort a keybindings file, writing only when `confirmed` is set.
pub fn sort_keybindings_file(
    fs: &dyn Filesystem,
    path: &Path,
    confirmed: bool,
) -> Result<SortOutcome> {
    let plan = plan_keybindings_sort(fs, path)?;
    finish(fs, plan, confirmed)
}

/// Sort a settings file, writing only when `confirmed` is set.
pub fn sort_settings_file(
    fs: &dyn Filesystem,
    path: &Path,
    confirmed: bool,
) -> Result<SortOutcome> {
    let plan = plan_settings_sort(fs, path)?;
    finish(fs, plan, confirmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::OsFilesystem;
    use crate::test_utils::MemoryFilesystem;
    use serde_json::json;
    use tempfile::TempDir;

    const KEYBINDINGS: &str = r#"// Place your key bindings in this file
[
    { "key": "ctrl+c", "command": "copy.when", "when": "editorFocus" },
    { "key": "a", "command": "cmd" },
    /* default copy */
    { "key": "ctrl+c", "command": "copy" },
    { "key": "-ctrl+x", "command": "cut" },
]
"#;

    #[test]
    fn test_sort_keybindings_file_writes_when_confirmed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("keybindings.json");
        std::fs::write(&path, KEYBINDINGS).unwrap();

        let outcome = sort_keybindings_file(&OsFilesystem, &path, true).unwrap();

        assert!(outcome.written);
        assert_eq!(outcome.entries, 4);
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("]\n"));
        let value: Value = serde_json::from_str(&text).unwrap();
        let keys: Vec<_> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["command"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(keys, vec!["cut", "cmd", "copy", "copy.when"]);
    }

    #[test]
    fn test_sort_not_confirmed_leaves_file() {
        let fs = MemoryFilesystem::new();
        fs.add_file("/u/keybindings.json", KEYBINDINGS);

        let outcome =
            sort_keybindings_file(&fs, Path::new("/u/keybindings.json"), false).unwrap();

        assert!(!outcome.written);
        assert_eq!(
            fs.read_to_string(Path::new("/u/keybindings.json")).unwrap(),
            KEYBINDINGS
        );
    }

    #[test]
    fn test_malformed_keybindings_not_written() {
        let fs = MemoryFilesystem::new();
        let original = r#"{"key": "ctrl+c", "command": "copy", "list": [1]}"#;
        fs.add_file("/u/keybindings.json", original);

        let path = Path::new("/u/keybindings.json");
        let err = sort_keybindings_file(&fs, path, true).unwrap_err();

        assert!(matches!(err, Error::MalformedArtifact { .. }));
        assert!(err.to_string().contains("array"));
        assert_eq!(
            fs.read_to_string(Path::new("/u/keybindings.json")).unwrap(),
            original
        );
    }

    #[test]
    fn test_missing_file() {
        let fs = MemoryFilesystem::new();
        let err = plan_keybindings_sort(&fs, Path::new("/u/keybindings.json")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_plan_is_idempotent() {
        let fs = MemoryFilesystem::new();
        fs.add_file("/u/keybindings.json", KEYBINDINGS);
        let path = Path::new("/u/keybindings.json");

        let first = plan_keybindings_sort(&fs, path).unwrap();
        assert!(first.changed);
        first.write(&fs).unwrap();

        let second = plan_keybindings_sort(&fs, path).unwrap();
        assert!(!second.changed);
        assert_eq!(second.rendered(), first.rendered());
    }

    #[test]
    fn test_sort_settings_file() {
        let fs = MemoryFilesystem::new();
        fs.add_file(
            "/u/settings.json",
            "// header\n{\n  \"z\": 1,\n  \"a.first\": false,\n  /* c */ \"a.first\": true, // dup\n}\n",
        );

        let outcome = sort_settings_file(&fs, Path::new("/u/settings.json"), true).unwrap();

        assert_eq!(outcome.entries, 2);
        let text = fs.read_to_string(Path::new("/u/settings.json")).unwrap();
        assert_eq!(text, "{\n  \"a.first\": true,\n  \"z\": 1\n}\n");
    }

    #[test]
    fn test_settings_array_is_malformed() {
        let fs = MemoryFilesystem::new();
        fs.add_file("/u/settings.json", "[1, 2]");
        let err = plan_settings_sort(&fs, Path::new("/u/settings.json")).unwrap_err();
        assert!(matches!(err, Error::MalformedArtifact { .. }));
    }

    #[test]
    fn test_empty_keybindings() {
        let fs = MemoryFilesystem::new();
        fs.add_file("/u/keybindings.json", "[\n]\n");
        let plan = plan_keybindings_sort(&fs, Path::new("/u/keybindings.json")).unwrap();
        assert_eq!(plan.entries, 0);
        assert_eq!(plan.rendered(), "[]\n");
        assert_eq!(
            serde_json::to_value(&plan).unwrap()["kind"],
            json!("keybindings")
        );
    }
}
