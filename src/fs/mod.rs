//! Filesystem access for layer repositories and editor config directories.
//!
//! The layer engine never touches `std::fs` directly; it reads through the
//! [`Filesystem`] trait so the merge and selection rules can run against an
//! in-memory tree. [`OsFilesystem`] is the real implementation.
//!
//! Destructive helpers used by `apply` and `pull` (backups, copies, cleanup)
//! live in [`ops`] and operate on the real filesystem only.

pub mod ops;

use crate::Result;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Minimal read/write/list/exists interface consumed by the layer engine.
pub trait Filesystem: Send + Sync {
    /// Read a whole file as UTF-8.
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Replace the contents of a file, creating parent directories.
    fn write(&self, path: &Path, contents: &str) -> Result<()>;

    /// List the direct children of a directory, sorted by path.
    fn list_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;

    /// Check whether anything exists at the path.
    fn exists(&self, path: &Path) -> bool;

    /// Check whether the path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Check whether the path is a regular file.
    fn is_file(&self, path: &Path) -> bool;
}

/// The host filesystem.
///
/// Writes go through a temporary file in the target directory which is then
/// renamed over the destination, so a failed write never leaves a truncated
/// file behind.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFilesystem;

impl Filesystem for OsFilesystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        tmp.write_all(contents.as_bytes())?;
        tmp.flush()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = std::fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort();
        Ok(entries)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Render a JSON value the way every file vsc-sync writes is rendered:
/// two-space indentation, non-ASCII kept verbatim, one trailing newline.
pub fn render_json(value: &serde_json::Value) -> Result<String> {
    let mut out = serde_json::to_string_pretty(value)?;
    out.push('\n');
    Ok(out)
}
