//! Account and point award specs

use crate::prelude::*;

#[test]
fn open_account_with_balance() {
    let temp = Project::empty();
    temp.kudos()
        .args(&["account", "open", "student-1", "--balance", "100"])
        .passes()
        .stdout_has("student-1")
        .stdout_has("balance=100");

    assert!(temp.data_dir().join("wal.jsonl").is_file());
}

#[test]
fn opening_twice_fails() {
    let temp = Project::empty();
    temp.account("student-1", 0);
    temp.kudos()
        .args(&["account", "open", "student-1"])
        .fails()
        .stderr_has("account already exists: student-1");
}

#[test]
fn award_and_deduct_update_balance() {
    let temp = Project::empty();
    temp.account("student-1", 10);

    temp.kudos()
        .args(&["account", "award", "student-1", "25", "--reason", "science fair"])
        .passes()
        .stdout_has("balance=35");
    temp.kudos()
        .args(&["account", "deduct", "student-1", "5", "--reason", "late"])
        .passes()
        .stdout_has("balance=30");

    assert_eq!(temp.balance("student-1"), 30);
}

#[test]
fn deduct_past_zero_fails_and_keeps_balance() {
    let temp = Project::empty();
    temp.account("student-1", 10);
    temp.kudos()
        .args(&["account", "deduct", "student-1", "11"])
        .fails()
        .stderr_has("insufficient funds");
    assert_eq!(temp.balance("student-1"), 10);
}

#[test]
fn history_lists_movements_oldest_first() {
    let temp = Project::empty();
    temp.account("student-1", 10);
    temp.kudos()
        .args(&["account", "award", "student-1", "5", "--reason", "kindness"])
        .passes();

    let history = temp.json(&["account", "history", "student-1"]);
    let entries = history.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["reason"]["kind"], "opening");
    assert_eq!(entries[1]["reason"]["note"], "kindness");
    assert_eq!(entries[1]["balance_after"], 15);

    temp.kudos()
        .args(&["account", "history", "student-1"])
        .passes()
        .stdout_has("award: kindness");
}

#[test]
fn data_dir_comes_from_environment() {
    let temp = Project::empty();
    let elsewhere = temp.path().join("school-ledger");
    temp.kudos()
        .env("KUDOS_DATA_DIR", &elsewhere)
        .args(&["account", "open", "student-1"])
        .passes();

    assert!(elsewhere.join("wal.jsonl").is_file());
    assert!(!temp.data_dir().exists());
}
