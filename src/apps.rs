//! Known VSCode-like editors and where they keep their files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A registered editor installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppDetails {
    pub alias: String,
    /// The editor's `User` directory.
    pub config_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executable_path: Option<PathBuf>,
}

impl AppDetails {
    pub fn new(alias: impl Into<String>, config_path: impl Into<PathBuf>) -> Self {
        Self {
            alias: alias.into(),
            config_path: config_path.into(),
            executable_path: None,
        }
    }

    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable_path = Some(executable.into());
        self
    }
}

/// Default locations of a known editor on the current platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultApp {
    pub alias: &'static str,
    pub config_path: PathBuf,
    pub executable: PathBuf,
}

const KNOWN_EDITORS: [&str; 6] = ["code", "cursor", "vscodium", "windsurf", "void", "pearai"];

/// Default app table for a home directory and OS name (`std::env::consts::OS`).
pub fn default_apps_for(home: &Path, os: &str) -> Vec<DefaultApp> {
    let app = |alias, config: PathBuf, executable: &str| DefaultApp {
        alias,
        config_path: config,
        executable: PathBuf::from(executable),
    };

    match os {
        "macos" => {
            let base = home.join("Library/Application Support");
            vec![
                app(
                    "vscode",
                    base.join("Code/User"),
                    "/Applications/Visual Studio Code.app/Contents/Resources/app/bin/code",
                ),
                app(
                    "vscodium",
                    base.join("VSCodium/User"),
                    "/Applications/VSCodium.app/Contents/Resources/app/bin/codium",
                ),
                app(
                    "cursor",
                    base.join("Cursor/User"),
                    "/Applications/Cursor.app/Contents/Resources/app/bin/cursor",
                ),
                app(
                    "windsurf",
                    base.join("Windsurf/User"),
                    "/Applications/Windsurf.app/Contents/Resources/app/bin/windsurf",
                ),
                app("void", base.join("Void/User"), "/usr/local/bin/void"),
                app(
                    "pearai",
                    base.join("PearAI/User"),
                    "/Applications/PearAI.app/Contents/Resources/app/bin/pearai",
                ),
            ]
        }
        "windows" => {
            let app_data = home.join("AppData").join("Roaming");
            vec![
                app(
                    "vscode",
                    app_data.join("Code").join("User"),
                    "C:/Program Files/Microsoft VS Code/bin/code.cmd",
                ),
                app(
                    "vscodium",
                    app_data.join("VSCodium").join("User"),
                    "C:/Program Files/VSCodium/bin/codium.cmd",
                ),
                app(
                    "cursor",
                    app_data.join("Cursor").join("User"),
                    "C:/Program Files/Cursor/cursor.exe",
                ),
            ]
        }
        _ => {
            let config = home.join(".config");
            vec![
                app("vscode", config.join("Code/User"), "/usr/bin/code"),
                app("vscodium", config.join("VSCodium/User"), "/usr/bin/codium"),
                app("cursor", config.join("Cursor/User"), "/usr/bin/cursor"),
            ]
        }
    }
}

/// Default app table for this machine. Empty when there is no home directory.
pub fn default_apps() -> Vec<DefaultApp> {
    dirs::home_dir()
        .map(|home| default_apps_for(&home, std::env::consts::OS))
        .unwrap_or_default()
}

/// Extension install directory for an alias under a home directory.
pub fn extension_directory_in(home: &Path, alias: &str) -> PathBuf {
    let dot_dir = match alias {
        "vscode" => ".vscode",
        "vscodium" => ".vscode-oss",
        "cursor" => ".cursor",
        "windsurf" => ".windsurf",
        "void" => ".void",
        "pearai" => ".pearai",
        other => return home.join(format!(".{}", other)).join("extensions"),
    };
    home.join(dot_dir).join("extensions")
}

/// Extension install directory for an alias on this machine.
pub fn extension_directory(alias: &str) -> Option<PathBuf> {
    dirs::home_dir().map(|home| extension_directory_in(&home, alias))
}

/// Find installed editors among `defaults`.
///
/// An editor counts as installed when its config directory exists. The
/// executable is the default path if present, else whatever `lookup`
/// finds for the alias.
pub fn discover<F>(defaults: Vec<DefaultApp>, lookup: F) -> Vec<AppDetails>
where
    F: Fn(&str) -> Option<PathBuf>,
{
    defaults
        .into_iter()
        .filter(|d| d.config_path.is_dir())
        .map(|d| {
            let executable = if d.executable.exists() {
                Some(d.executable)
            } else {
                lookup(d.alias)
            };
            tracing::debug!(alias = d.alias, path = %d.config_path.display(), "discovered app");
            AppDetails {
                alias: d.alias.to_string(),
                config_path: d.config_path,
                executable_path: executable,
            }
        })
        .collect()
}

/// Discover installed editors on this machine, searching `PATH` for executables.
pub fn auto_discover() -> Vec<AppDetails> {
    discover(default_apps(), |alias| which::which(alias).ok())
}

/// Heuristic check that a directory is an editor `User` directory.
///
/// True if it holds settings, keybindings or snippets, or if it is empty
/// but its parent is named after a known editor.
pub fn validate_config_path(path: &Path) -> bool {
    if !path.is_dir() {
        return false;
    }
    let markers = ["settings.json", "keybindings.json", "snippets"];
    if markers.iter().any(|m| path.join(m).exists()) {
        return true;
    }
    let parent = path
        .parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    KNOWN_EDITORS.iter().any(|e| parent.contains(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_linux_defaults() {
        let apps = default_apps_for(Path::new("/home/me"), "linux");
        let aliases: Vec<_> = apps.iter().map(|a| a.alias).collect();
        assert_eq!(aliases, vec!["vscode", "vscodium", "cursor"]);
        assert_eq!(apps[0].config_path, PathBuf::from("/home/me/.config/Code/User"));
        assert_eq!(apps[0].executable, PathBuf::from("/usr/bin/code"));
    }

    #[test]
    fn test_macos_defaults() {
        let apps = default_apps_for(Path::new("/Users/me"), "macos");
        assert_eq!(apps.len(), 6);
        assert_eq!(
            apps[2].config_path,
            PathBuf::from("/Users/me/Library/Application Support/Cursor/User")
        );
    }

    #[test]
    fn test_extension_directory() {
        let home = Path::new("/home/me");
        assert_eq!(
            extension_directory_in(home, "vscodium"),
            PathBuf::from("/home/me/.vscode-oss/extensions")
        );
        assert_eq!(
            extension_directory_in(home, "trae"),
            PathBuf::from("/home/me/.trae/extensions")
        );
    }

    #[test]
    fn test_discover_uses_config_dir_and_lookup() {
        let home = TempDir::new().unwrap();
        std::fs::create_dir_all(home.path().join(".config/Cursor/User")).unwrap();

        let found = discover(default_apps_for(home.path(), "linux"), |alias| {
            (alias == "cursor").then(|| PathBuf::from("/opt/cursor/bin/cursor"))
        });

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].alias, "cursor");
        assert_eq!(
            found[0].executable_path,
            Some(PathBuf::from("/opt/cursor/bin/cursor"))
        );
    }

    #[test]
    fn test_validate_config_path() {
        let dir = TempDir::new().unwrap();
        let used = dir.path().join("Whatever/User");
        std::fs::create_dir_all(&used).unwrap();
        assert!(!validate_config_path(&used));

        std::fs::write(used.join("settings.json"), "{}").unwrap();
        assert!(validate_config_path(&used));

        let fresh = dir.path().join("Code/User");
        std::fs::create_dir_all(&fresh).unwrap();
        assert!(validate_config_path(&fresh));

        assert!(!validate_config_path(&dir.path().join("missing")));
    }

    #[test]
    fn test_app_details_serialization() {
        let app = AppDetails::new("vscode", "/c/User");
        let json = serde_json::to_value(&app).unwrap();
        assert!(json.get("executable_path").is_none());

        let app = app.with_executable("/usr/bin/code");
        let json = serde_json::to_value(&app).unwrap();
        assert_eq!(json["executable_path"], "/usr/bin/code");
    }
}
