//! `vsc-sync sort <FILE>`: canonically sort a keybindings or settings file.

use super::{Output, Prompt, json};
use crate::fs::OsFilesystem;
use crate::sort::{SortKind, plan_keybindings_sort, plan_settings_sort};
use crate::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize)]
pub struct SortFileResult {
    pub path: PathBuf,
    pub kind: SortKind,
    pub entries: usize,
    pub changed: bool,
    pub written: bool,
    pub dry_run: bool,
}

impl Output for SortFileResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let unit = match self.kind {
            SortKind::Keybindings => "keybindings",
            SortKind::Settings => "settings",
        };
        if !self.changed {
            format!("{} already sorted ({} {})", self.path.display(), self.entries, unit)
        } else if self.written {
            format!("Sorted {} {} in {}", self.entries, unit, self.path.display())
        } else if self.dry_run {
            format!(
                "DRY RUN - {} would be rewritten ({} {})",
                self.path.display(),
                self.entries,
                unit
            )
        } else {
            format!("{} left unchanged", self.path.display())
        }
    }
}

/// Guess the kind from the file name.
pub fn infer_kind(path: &Path) -> Result<SortKind> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if name.starts_with("keybindings") {
        Ok(SortKind::Keybindings)
    } else if name.starts_with("settings") {
        Ok(SortKind::Settings)
    } else {
        Err(Error::InvalidInput(format!(
            "Cannot tell whether {} holds keybindings or settings; pass --kind",
            path.display()
        )))
    }
}

/// Sort a file in place. Nothing is written on `dry_run`, when the file
/// is already sorted, or when the prompt is declined.
pub fn sort_file(
    path: &Path,
    kind: Option<SortKind>,
    yes: bool,
    dry_run: bool,
    prompt: &mut dyn Prompt,
) -> Result<SortFileResult> {
    let kind = match kind {
        Some(kind) => kind,
        None => infer_kind(path)?,
    };
    let fs = OsFilesystem;
    let plan = match kind {
        SortKind::Keybindings => plan_keybindings_sort(&fs, path)?,
        SortKind::Settings => plan_settings_sort(&fs, path)?,
    };

    let written = plan.changed
        && !dry_run
        && (yes
            || prompt.confirm(
                &format!(
                    "Rewrite {} in sorted order? Comments will be removed.",
                    path.display()
                ),
                true,
            ));
    if written {
        plan.write(&fs)?;
    }

    Ok(SortFileResult {
        path: plan.path,
        kind,
        entries: plan.entries,
        changed: plan.changed,
        written,
        dry_run,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::AssumeYes;
    use crate::test_utils::ScriptedPrompt;
    use tempfile::TempDir;

    #[test]
    fn test_infer_kind() {
        assert_eq!(
            infer_kind(Path::new("/u/keybindings.json")).unwrap(),
            SortKind::Keybindings
        );
        assert_eq!(infer_kind(Path::new("Settings.json")).unwrap(), SortKind::Settings);
        assert!(infer_kind(Path::new("tasks.json")).is_err());
    }

    #[test]
    fn test_sort_settings_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{\"b\": 1, /* x */ \"a\": {\"z\": 1, \"y\": 2}}").unwrap();

        let result = sort_file(&path, None, false, false, &mut AssumeYes).unwrap();

        assert!(result.written);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "{\n  \"a\": {\n    \"z\": 1,\n    \"y\": 2\n  },\n  \"b\": 1\n}\n"
        );

        let again = sort_file(&path, None, false, false, &mut AssumeYes).unwrap();
        assert!(!again.changed);
        assert!(!again.written);
    }

    #[test]
    fn test_dry_run_and_declined() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("my-bindings.json");
        let original = "[{\"key\": \"b\", \"command\": \"x\"}, {\"key\": \"a\", \"command\": \"y\"}]";
        std::fs::write(&path, original).unwrap();

        let mut prompt = ScriptedPrompt::default();
        let result =
            sort_file(&path, Some(SortKind::Keybindings), false, true, &mut prompt).unwrap();
        assert!(result.changed && !result.written);
        assert!(prompt.asked.is_empty());
        assert!(result.to_human().starts_with("DRY RUN"));

        let mut prompt = ScriptedPrompt::new(&[false]);
        let result =
            sort_file(&path, Some(SortKind::Keybindings), false, false, &mut prompt).unwrap();
        assert!(!result.written);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = sort_file(
            &dir.path().join("keybindings.json"),
            None,
            true,
            false,
            &mut AssumeYes,
        )
        .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
