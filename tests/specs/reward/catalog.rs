//! Reward catalog specs

use crate::prelude::*;

#[test]
fn create_and_show_reward() {
    let temp = Project::empty();
    let id = temp.reward("Pizza lunch", 30, "5");

    temp.kudos()
        .args(&["reward", "show", &id])
        .passes()
        .stdout_has("Pizza lunch")
        .stdout_has("cost=30")
        .stdout_has("stock=5")
        .stdout_has("active");
}

#[test]
fn stock_defaults_to_unlimited() {
    let temp = Project::empty();
    let reward = temp.json(&["reward", "create", "Homework pass", "--cost", "10"]);
    assert_eq!(reward["stock"], "unlimited");
    assert_eq!(reward["active"], true);
}

#[test]
fn list_active_hides_inactive_rewards() {
    let temp = Project::empty();
    temp.reward("Pizza lunch", 30, "5");
    temp.kudos()
        .args(&["reward", "create", "Field trip", "--cost", "90", "--inactive"])
        .passes();

    temp.kudos()
        .args(&["reward", "list"])
        .passes()
        .stdout_has("Pizza lunch")
        .stdout_has("Field trip");
    temp.kudos()
        .args(&["reward", "list", "--active"])
        .passes()
        .stdout_has("Pizza lunch")
        .stdout_lacks("Field trip");
}

#[test]
fn empty_catalog_says_so() {
    let temp = Project::empty();
    temp.kudos()
        .args(&["reward", "list"])
        .passes()
        .stdout_has("No rewards");
}

#[test]
fn update_changes_only_given_fields() {
    let temp = Project::empty();
    let id = temp.reward("Pizza lunch", 30, "5");

    let updated = temp.json(&["reward", "update", &id, "--cost", "40", "--active", "false"]);
    assert_eq!(updated["cost"], 40);
    assert_eq!(updated["active"], false);
    assert_eq!(updated["name"], "Pizza lunch");
    assert_eq!(updated["stock"], 5);
}

#[test]
fn inactive_reward_cannot_be_redeemed() {
    let temp = Project::empty();
    temp.account("student-1", 100);
    let id = temp.reward("Pizza lunch", 30, "5");
    temp.kudos()
        .args(&["reward", "update", &id, "--active", "false"])
        .passes();

    temp.kudos()
        .args(&["redeem", "student-1", &id])
        .fails()
        .stderr_has("reward is not active");
    assert_eq!(temp.balance("student-1"), 100);
}

#[test]
fn delete_refused_while_redemptions_pending() {
    let temp = Project::empty();
    temp.account("student-1", 100);
    let id = temp.reward("Pizza lunch", 30, "5");
    let rdm = temp.redeem("student-1", &id, 1);

    temp.kudos()
        .args(&["reward", "delete", &id])
        .fails()
        .stderr_has("pending redemption");

    temp.kudos()
        .args(&["redemption", "approve", &rdm])
        .passes();
    temp.kudos()
        .args(&["reward", "delete", &id])
        .passes()
        .stdout_has(&format!("Deleted {}", id));
    temp.kudos()
        .args(&["reward", "show", &id])
        .fails()
        .stderr_has("reward not found");
}
