//! File operations on editor config directories.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Default backup suffix: `bak.<unix seconds>`.
pub fn default_backup_suffix() -> String {
    format!("bak.{}", chrono::Utc::now().timestamp())
}

/// Copy a directory to a sibling named `<dir>.<suffix>`.
///
/// Fails if the source is missing or the backup path is already taken.
pub fn backup_directory(source: &Path, suffix: &str) -> Result<PathBuf> {
    if !source.is_dir() {
        return Err(Error::ConfigNotFound(source.to_path_buf()));
    }
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| Error::InvalidInput(format!("Cannot back up {}", source.display())))?;
    let backup = source.with_file_name(format!("{}.{}", name, suffix));
    if backup.exists() {
        return Err(Error::Other(format!(
            "Backup path already exists: {}",
            backup.display()
        )));
    }

    copy_dir_recursive(source, &backup)?;
    tracing::info!(source = %source.display(), backup = %backup.display(), "created backup");
    Ok(backup)
}

/// Recursively copy `src` into `dst`, creating `dst`.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    for entry in WalkDir::new(src).follow_links(false) {
        let entry = entry.map_err(std::io::Error::from)?;
        let rel = entry.path().strip_prefix(src).map_err(|_| {
            Error::Other(format!("{} is outside {}", entry.path().display(), src.display()))
        })?;
        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Copy the direct file children of `src` into `dst`.
///
/// Existing files in `dst` are replaced only when `overwrite` is set.
/// Returns the number of files copied.
pub fn copy_dir_contents(src: &Path, dst: &Path, overwrite: bool) -> Result<usize> {
    std::fs::create_dir_all(dst)?;
    let mut copied = 0;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
            continue;
        }
        if target.exists() && !overwrite {
            tracing::debug!(path = %target.display(), "keeping existing file");
            continue;
        }
        std::fs::copy(entry.path(), &target)?;
        copied += 1;
    }
    Ok(copied)
}

/// Copy a single file, creating the destination directory.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(src, dst)?;
    Ok(())
}

/// Remove a file or directory tree. Returns false if nothing was there.
pub fn remove_path(path: &Path) -> Result<bool> {
    if path.is_dir() {
        std::fs::remove_dir_all(path)?;
        Ok(true)
    } else if path.exists() {
        std::fs::remove_file(path)?;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// List the `*.code-snippets` and `*.json` files in a snippets directory.
pub fn snippet_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_snippet = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == "code-snippets" || e == "json");
        if path.is_file() && is_snippet {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
