//! Integration tests for `vsc-sync apply`.
//!
//! These tests verify that layers are merged and written into the app's
//! config directory:
//! - precedence base < app < stacks, in the order given
//! - backups, dry runs and declined confirmations
//! - missing optional layers are skipped, a missing base is fatal

mod common;

use common::{TestEnv, parse_json};
use predicates::prelude::*;
use serde_json::json;

/// Initialized environment with app and stack layers.
fn layered_env() -> TestEnv {
    let env = TestEnv::init();
    env.write_layer_file("apps/vscode/settings.json", r#"{"editor.fontSize": 16}"#);
    env.write_layer_file(
        "stacks/python/settings.json",
        r#"{
            // formatter for the python stack
            "python.formatting.provider": "black",
            "editor.tabSize": 4,
        }"#,
    );
    env.write_layer_file(
        "stacks/python/snippets/python.code-snippets",
        r#"{"main": {"prefix": "main", "body": ["if __name__ == '__main__':"]}}"#,
    );
    std::fs::write(env.user_dir().join("settings.json"), r#"{"old": true}"#).unwrap();
    env
}

#[test]
fn test_apply_writes_merged_settings() {
    let env = layered_env();

    let output = env
        .vsc()
        .args(["apply", "vscode", "--stack", "python", "--force"])
        .args(["--backup-suffix", "bak.test"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let result = parse_json(&output.stdout);
    assert_eq!(
        result["layers_applied"],
        json!(["base", "app:vscode", "stack:python"])
    );
    assert_eq!(result["settings_written"], true);
    assert_eq!(
        result["extensions_skipped"],
        "no extensions recommended by any layer"
    );

    let settings = env.read_json(env.user_dir().join("settings.json"));
    assert_eq!(settings["editor.fontSize"], 16);
    assert_eq!(settings["editor.tabSize"], 4);
    assert_eq!(settings["editor.insertSpaces"], true);
    assert_eq!(settings["python.formatting.provider"], "black");
    assert!(settings.get("old").is_none());

    assert!(env.user_dir().join("keybindings.json").is_file());
    assert!(
        env.user_dir()
            .join("snippets/python.code-snippets")
            .is_file()
    );

    let backup = env.home_path().join("Code/User.bak.test/settings.json");
    assert_eq!(std::fs::read_to_string(backup).unwrap(), r#"{"old": true}"#);
}

#[test]
fn test_later_stack_wins() {
    let env = layered_env();
    env.write_layer_file("stacks/rust/settings.json", r#"{"editor.tabSize": 8}"#);

    env.vsc()
        .args(["apply", "vscode", "-s", "python,rust", "--force"])
        .assert()
        .success();
    let settings = env.read_json(env.user_dir().join("settings.json"));
    assert_eq!(settings["editor.tabSize"], 8);

    env.vsc()
        .args(["apply", "vscode", "-s", "rust,python", "--force"])
        .args(["--backup-suffix", "bak.second"])
        .assert()
        .success();
    let settings = env.read_json(env.user_dir().join("settings.json"));
    assert_eq!(settings["editor.tabSize"], 4);
}

#[test]
fn test_dry_run_changes_nothing() {
    let env = layered_env();

    let output = env
        .vsc()
        .args(["apply", "vscode", "-s", "python", "--dry-run"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let result = parse_json(&output.stdout);
    assert_eq!(result["dry_run"], true);
    assert!(result.get("backup").is_none());
    let added = result["settings_changes"]["added"].as_array().unwrap();
    assert!(added.contains(&json!("python.formatting.provider")));
    assert_eq!(result["settings_changes"]["removed"], json!(["old"]));

    assert_eq!(
        std::fs::read_to_string(env.user_dir().join("settings.json")).unwrap(),
        r#"{"old": true}"#
    );
}

#[test]
fn test_dry_run_human_output() {
    let env = layered_env();
    env.vsc()
        .args(["apply", "vscode", "--dry-run", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("DRY RUN"))
        .stdout(predicate::str::contains("base -> app:vscode"));
}

#[test]
fn test_non_interactive_apply_is_cancelled() {
    let env = layered_env();

    let output = env.vsc().args(["apply", "vscode"]).output().unwrap();
    assert!(output.status.success());
    assert_eq!(parse_json(&output.stdout)["cancelled"], true);

    assert_eq!(
        std::fs::read_to_string(env.user_dir().join("settings.json")).unwrap(),
        r#"{"old": true}"#
    );
}

#[test]
fn test_missing_stack_is_skipped() {
    let env = layered_env();

    let output = env
        .vsc()
        .args(["apply", "vscode", "-s", "nosuch", "--force"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let result = parse_json(&output.stdout);
    assert_eq!(result["layers_applied"], json!(["base", "app:vscode"]));
    assert!(
        result["skipped"][0]
            .as_str()
            .unwrap()
            .contains("nosuch")
    );
}

#[test]
fn test_component_flags() {
    let env = layered_env();
    std::fs::write(env.user_dir().join("keybindings.json"), "[1]").unwrap();

    env.vsc()
        .args(["apply", "vscode", "--force", "--no-keybindings", "--no-snippets"])
        .assert()
        .success();

    assert_eq!(
        std::fs::read_to_string(env.user_dir().join("keybindings.json")).unwrap(),
        "[1]"
    );
    assert!(!env.user_dir().join("snippets").exists());
}

#[test]
fn test_extensions_need_an_executable() {
    let env = layered_env();
    env.write_layer_file(
        "base/extensions.json",
        r#"{"recommendations": ["rust-lang.rust-analyzer"]}"#,
    );

    let output = env
        .vsc()
        .args(["apply", "vscode", "--dry-run"])
        .output()
        .unwrap();
    let result = parse_json(&output.stdout);
    assert_eq!(result["extensions_skipped"], "no executable configured");
}

#[test]
fn test_missing_base_is_fatal() {
    let env = layered_env();
    std::fs::remove_dir_all(env.repo_path().join("base")).unwrap();

    env.vsc()
        .args(["apply", "vscode", "--force", "-H"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration not found"));
    assert_eq!(
        std::fs::read_to_string(env.user_dir().join("settings.json")).unwrap(),
        r#"{"old": true}"#
    );
}

#[test]
fn test_unregistered_app() {
    let env = TestEnv::init();
    let output = env
        .vsc()
        .args(["apply", "cursor", "--force"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let err = parse_json(&output.stderr);
    let message = err["error"].as_str().unwrap();
    assert!(message.contains("'cursor' is not registered"));
    assert!(message.contains("vscode"));
}
