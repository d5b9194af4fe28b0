//! End-to-end tests for the file-backed store and the `ps` binary

use assert_cmd::Command;
use predicates::prelude::*;
use prefstore::{PreferenceRecord, PreferenceStore, SaveOutcome};
use tempfile::TempDir;

#[test]
fn test_file_store_survives_reopen() {
    let temp = TempDir::new().unwrap();

    {
        let store = PreferenceStore::open(temp.path()).unwrap();
        assert_eq!(store.remember("alice", "budget", "hiking", "Lisbon"), SaveOutcome::Saved);
        assert_eq!(store.remember("alice", "budget", "hiking", "Porto"), SaveOutcome::Saved);
    }

    let store = PreferenceStore::open(temp.path()).unwrap();
    let record = store.load("alice").unwrap();
    assert_eq!(record.past_destinations, vec!["Lisbon", "Porto"]);
    assert_eq!(record.preferences, "budget");
}

#[test]
fn test_file_store_malformed_record_degrades() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("alice.json"), "[1, 2, 3]").unwrap();

    let store = PreferenceStore::open(temp.path()).unwrap();
    assert!(store.load("alice").is_none());
    assert!(store.try_load("alice").is_err());
}

#[test]
fn test_file_store_malformed_record_is_not_overwritten() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("alice.json");
    std::fs::write(&path, "{\"preferences\": \"budget\", \"past_destinations\": [").unwrap();

    let store = PreferenceStore::open(temp.path()).unwrap();
    let outcome = store.remember("alice", "luxury", "spas", "Bali");

    assert!(matches!(outcome, SaveOutcome::Failed(ref reason) if reason.contains("Malformed record")));
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "{\"preferences\": \"budget\", \"past_destinations\": ["
    );
}

#[test]
fn test_file_store_save_still_replaces_malformed_record() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("alice.json"), "[1, 2, 3]").unwrap();

    let store = PreferenceStore::open(temp.path()).unwrap();
    let record = PreferenceRecord::new("luxury", "spas").with_destinations(["Bali"]);
    assert!(store.save("alice", &record).is_saved());
    assert_eq!(store.load("alice").unwrap().past_destinations, vec!["Bali"]);
}

#[test]
fn test_six_saves_keep_five_most_recent() {
    let temp = TempDir::new().unwrap();
    let store = PreferenceStore::open(temp.path()).unwrap();

    let record = PreferenceRecord::new("family", "beaches").with_destinations(["A", "B", "C", "D", "E", "F"]);
    assert!(store.save("bob", &record).is_saved());

    assert_eq!(store.load("bob").unwrap().past_destinations, vec!["B", "C", "D", "E", "F"]);
}

#[test]
fn test_cli_show_list_forget() {
    let temp = TempDir::new().unwrap();
    let store = PreferenceStore::open(temp.path()).unwrap();
    store.remember("alice", "solo travel", "photography", "Reykjavik");

    Command::cargo_bin("ps")
        .unwrap()
        .args(["--store", temp.path().to_str().unwrap(), "show", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("photography"))
        .stdout(predicate::str::contains("Reykjavik"));

    Command::cargo_bin("ps")
        .unwrap()
        .args(["--store", temp.path().to_str().unwrap(), "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("alice"));

    Command::cargo_bin("ps")
        .unwrap()
        .args(["--store", temp.path().to_str().unwrap(), "forget", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Forgot"));

    Command::cargo_bin("ps")
        .unwrap()
        .args(["--store", temp.path().to_str().unwrap(), "show", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved preferences"));
}

#[test]
fn test_cli_logs_startup_at_info() {
    let temp = TempDir::new().unwrap();

    Command::cargo_bin("ps")
        .unwrap()
        .env_remove("RUST_LOG")
        .args(["--store", temp.path().to_str().unwrap(), "list"])
        .assert()
        .success()
        .stderr(predicate::str::contains("prefstore starting at"));
}
