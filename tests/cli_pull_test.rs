//! Integration tests for `vsc-sync pull`.

mod common;

use common::{TestEnv, parse_json};
use predicates::prelude::*;

fn live_env() -> TestEnv {
    let env = TestEnv::init();
    let user = env.user_dir();
    std::fs::write(user.join("settings.json"), r#"{"editor.fontSize": 18}"#).unwrap();
    std::fs::write(user.join("keybindings.json"), "[]").unwrap();
    std::fs::create_dir_all(user.join("snippets")).unwrap();
    std::fs::write(user.join("snippets/go.code-snippets"), "{}").unwrap();
    env
}

fn action<'a>(result: &'a serde_json::Value, artifact: &str) -> &'a str {
    result["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["artifact"] == artifact)
        .and_then(|i| i["action"].as_str())
        .unwrap()
}

#[test]
fn test_pull_into_app_layer() {
    let env = live_env();

    let output = env
        .vsc()
        .args(["pull", "vscode", "--overwrite"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let result = parse_json(&output.stdout);
    assert_eq!(action(&result, "settings"), "copied");
    assert_eq!(action(&result, "keybindings"), "copied");
    assert_eq!(action(&result, "snippets"), "copied");
    // no executable registered for the app
    assert_eq!(action(&result, "extensions"), "skipped");

    let layer = env.repo_path().join("apps/vscode");
    assert_eq!(
        std::fs::read_to_string(layer.join("settings.json")).unwrap(),
        r#"{"editor.fontSize": 18}"#
    );
    assert!(layer.join("snippets/go.code-snippets").is_file());
}

#[test]
fn test_pull_dry_run_into_stack() {
    let env = live_env();

    let output = env
        .vsc()
        .args(["pull", "vscode", "--layer-type", "stack", "--layer-name", "go"])
        .args(["--dry-run", "--settings-only"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let result = parse_json(&output.stdout);
    let items = result["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(action(&result, "settings"), "would-copy");
    assert!(!env.repo_path().join("stacks/go").exists());
}

#[test]
fn test_pull_stack_needs_a_name() {
    let env = live_env();

    env.vsc()
        .args(["pull", "vscode", "-t", "stack", "--overwrite", "-H"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid layer"));
}

#[test]
fn test_pull_non_interactive_is_cancelled() {
    let env = live_env();

    let output = env.vsc().args(["pull", "vscode"]).output().unwrap();
    assert!(output.status.success());
    assert_eq!(parse_json(&output.stdout)["cancelled"], true);
    assert!(!env.repo_path().join("apps/vscode").exists());
}

#[test]
fn test_pull_from_project() {
    let env = TestEnv::init();
    let project = env.home_path().join("service");
    std::fs::create_dir_all(project.join(".vscode")).unwrap();
    std::fs::write(project.join(".vscode/settings.json"), r#"{"go.lintTool": "golangci-lint"}"#)
        .unwrap();

    let output = env
        .vsc()
        .arg("pull")
        .arg(&project)
        .args(["--project", "--layer-type", "project", "--overwrite"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let result = parse_json(&output.stdout);
    assert_eq!(result["source"], "service");
    assert_eq!(action(&result, "extensions"), "skipped");
    let pulled = env.read_json(env.repo_path().join("projects/service/settings.json"));
    assert_eq!(pulled["go.lintTool"], "golangci-lint");
}
