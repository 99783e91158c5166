//! Durability and configuration specs

use crate::prelude::*;
use std::io::Write;

#[test]
fn state_survives_between_invocations() {
    let temp = Project::empty();
    temp.account("student-1", 100);
    let rwd = temp.reward("Pizza lunch", 30, "2");
    temp.redeem("student-1", &rwd, 1);

    assert_eq!(temp.balance("student-1"), 70);
    let history = temp.json(&["account", "history", "student-1"]);
    assert_eq!(history.as_array().unwrap().len(), 2);
}

#[test]
fn config_file_is_read_from_data_dir() {
    let temp = Project::empty();
    temp.file(
        ".kudos/kudos.toml",
        "[ledger]\nlock_timeout = \"500ms\"\ncommit_retries = 1\n\n[store]\nmachine_id = \"front-office\"\n",
    );
    temp.account("student-1", 5);

    let wal = std::fs::read_to_string(temp.data_dir().join("wal.jsonl")).unwrap();
    assert!(wal.contains("front-office"));
}

#[test]
fn invalid_config_fails() {
    let temp = Project::empty();
    temp.file(".kudos/kudos.toml", "[ledger]\nlock_timeout = \"0s\"\n");
    temp.kudos()
        .args(&["account", "open", "student-1"])
        .fails()
        .stderr_has("lock_timeout must be greater than zero");

    temp.file(".kudos/kudos.toml", "[ledger]\nsurprise = true\n");
    temp.kudos()
        .args(&["account", "open", "student-1"])
        .fails()
        .stderr_has("invalid config");
}

#[test]
fn torn_final_line_is_discarded() {
    let temp = Project::empty();
    temp.account("student-1", 100);
    let mut wal = std::fs::OpenOptions::new()
        .append(true)
        .open(temp.data_dir().join("wal.jsonl"))
        .unwrap();
    wal.write_all(br#"{"sequence":9,"#).unwrap();
    drop(wal);

    assert_eq!(temp.balance("student-1"), 100);
}

#[test]
fn corrupt_ledger_fails_until_repaired() {
    let temp = Project::empty();
    temp.account("student-1", 100);
    let mut wal = std::fs::OpenOptions::new()
        .append(true)
        .open(temp.data_dir().join("wal.jsonl"))
        .unwrap();
    wal.write_all(b"not json\n").unwrap();
    drop(wal);

    temp.kudos()
        .args(&["account", "show", "student-1"])
        .fails()
        .stderr_has("corrupted");

    temp.kudos()
        .args(&["repair"])
        .passes()
        .stdout_has("Removed 9 bytes");
    assert_eq!(temp.balance("student-1"), 100);

    temp.kudos()
        .args(&["repair"])
        .passes()
        .stdout_has("intact");
}
