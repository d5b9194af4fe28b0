//! End-to-end tests for the `ta` binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `ta` isolated from the developer's home, config, logs and .env
fn ta(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ta").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env_remove("ANTHROPIC_API_KEY")
        .env_remove("TAVILY_API_KEY");
    cmd
}

#[test]
fn test_tools_lists_travel_tools() {
    let home = TempDir::new().unwrap();
    ta(&home)
        .arg("tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("calculate_trip_duration"))
        .stdout(predicate::str::contains("get_season_info"))
        .stdout(predicate::str::contains("web_search"));
}

#[test]
fn test_tools_schema_prints_json() {
    let home = TempDir::new().unwrap();
    ta(&home)
        .args(["tools", "--schema"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"start_date\""));
}

#[test]
fn test_plan_without_keys_names_them_and_fails() {
    let home = TempDir::new().unwrap();
    ta(&home)
        .args(["plan", "--from", "Boston", "--to", "Kyoto"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ANTHROPIC_API_KEY"))
        .stderr(predicate::str::contains("TAVILY_API_KEY"));
}

#[test]
fn test_search_disabled_in_config_drops_tool_and_key() {
    let home = TempDir::new().unwrap();
    std::fs::write(home.path().join(".travelagent.yml"), "search:\n  enabled: false\n").unwrap();

    ta(&home)
        .arg("tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("web_search").not());

    ta(&home)
        .arg("plan")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ANTHROPIC_API_KEY"))
        .stderr(predicate::str::contains("TAVILY_API_KEY").not());
}

#[test]
fn test_prefs_for_unknown_user() {
    let home = TempDir::new().unwrap();
    let store = home.path().join("prefs");
    std::fs::write(
        home.path().join(".travelagent.yml"),
        format!("memory:\n  store-dir: {}\n", store.display()),
    )
    .unwrap();

    ta(&home)
        .args(["prefs", "nobody"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved preferences"));
}
