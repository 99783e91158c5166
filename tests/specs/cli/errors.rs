//! Error reporting specs
//!
//! Economy errors exit non-zero with a readable message on stderr.

use crate::prelude::*;

#[test]
fn unknown_command_fails() {
    let temp = Project::empty();
    temp.kudos().args(&["teleport"]).fails();
}

#[test]
fn missing_account_is_reported() {
    let temp = Project::empty();
    temp.kudos()
        .args(&["account", "show", "nobody"])
        .fails()
        .stderr_has("account not found: nobody");
}

#[test]
fn missing_reward_is_reported() {
    let temp = Project::empty();
    temp.account("student-1", 50);
    temp.kudos()
        .args(&["redeem", "student-1", "rwd-missing"])
        .fails()
        .stderr_has("reward not found: rwd-missing");
}

#[test]
fn invalid_stock_value_is_rejected() {
    let temp = Project::empty();
    temp.kudos()
        .args(&["reward", "create", "Sticker", "--cost", "5", "--stock", "plenty"])
        .fails()
        .stderr_has("invalid stock");
}

#[test]
fn zero_cost_reward_is_rejected() {
    let temp = Project::empty();
    temp.kudos()
        .args(&["reward", "create", "Sticker", "--cost", "0"])
        .fails()
        .stderr_has("reward cost must be positive");
}
