//! vsc-sync - Layered configuration sync for VSCode-like editors.
//!
//! This library provides the core functionality for the `vsc-sync` CLI tool:
//! resolving configuration layers (base, app, stacks, projects), merging
//! their settings, collecting extensions and snippets, and the canonical
//! sort passes for `keybindings.json` and `settings.json`.

pub mod apps;
pub mod cli;
pub mod commands;
pub mod config;
pub mod extensions;
pub mod fs;
pub mod jsonc;
pub mod layers;
pub mod sort;

use std::path::PathBuf;


/// Library-level error type for vsc-sync operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse config {path}: {message}")]
    Kdl { path: PathBuf, message: String },

    /// The repository root or the base layer directory is missing.
    #[error("Configuration not found: {0}")]
    ConfigNotFound(PathBuf),

    /// A layer that was explicitly required does not exist.
    #[error("Layer not found: {layer} (expected directory {path})")]
    LayerNotFound { layer: String, path: PathBuf },

    #[error("Invalid layer: {0}")]
    InvalidLayer(String),

    /// A file could not be interpreted as the structure an operation needs.
    #[error("Malformed {path}: {reason}")]
    MalformedArtifact { path: PathBuf, reason: String },

    #[error(transparent)]
    Extension(#[from] extensions::ExtensionError),

    #[error("App '{alias}' is not registered. Available apps: {available}")]
    AppNotRegistered { alias: String, available: String },

    #[error("App config directory does not exist: {0}")]
    AppConfigPath(PathBuf),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("vsc-sync is not initialized. Run 'vsc-sync init' first.")]
    NotInitialized,

    #[error("{0}")]
    Other(String),
}

/// Result type alias for vsc-sync operations.
pub type Result<T> = std::result::Result<T, Error>;
