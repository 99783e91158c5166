//! Redemption workflow specs
//!
//! Claiming debits points and reserves stock together; rejecting returns
//! both exactly once.

use crate::prelude::*;

#[test]
fn redeem_debits_points_and_reserves_stock() {
    let temp = Project::empty();
    temp.account("student-1", 100);
    let rwd = temp.reward("Pizza lunch", 30, "2");

    let redemption = temp.json(&["redeem", "student-1", &rwd, "-q", "2"]);
    assert_eq!(redemption["status"], "pending");
    assert_eq!(redemption["points_spent"], 60);
    assert_eq!(redemption["quantity"], 2);

    assert_eq!(temp.balance("student-1"), 40);
    assert_eq!(temp.json(&["reward", "show", &rwd])["stock"], 0);
}

#[test]
fn insufficient_funds_changes_nothing() {
    let temp = Project::empty();
    temp.account("student-1", 20);
    let rwd = temp.reward("Pizza lunch", 30, "2");

    temp.kudos()
        .args(&["redeem", "student-1", &rwd])
        .fails()
        .stderr_has("insufficient funds");

    assert_eq!(temp.balance("student-1"), 20);
    assert_eq!(temp.json(&["reward", "show", &rwd])["stock"], 2);
    temp.kudos()
        .args(&["redemption", "list"])
        .passes()
        .stdout_has("No redemptions");
}

#[test]
fn insufficient_stock_changes_nothing() {
    let temp = Project::empty();
    temp.account("student-1", 100);
    let rwd = temp.reward("Pizza lunch", 30, "1");

    temp.kudos()
        .args(&["redeem", "student-1", &rwd, "-q", "2"])
        .fails()
        .stderr_has("insufficient stock");

    assert_eq!(temp.balance("student-1"), 100);
    assert_eq!(temp.json(&["reward", "show", &rwd])["stock"], 1);
}

#[test]
fn reject_refunds_once() {
    let temp = Project::empty();
    temp.account("student-1", 100);
    let rwd = temp.reward("Pizza lunch", 30, "2");
    let rdm = temp.redeem("student-1", &rwd, 1);
    assert_eq!(temp.balance("student-1"), 70);

    temp.kudos()
        .args(&["redemption", "reject", &rdm])
        .passes()
        .stdout_has("rejected");
    assert_eq!(temp.balance("student-1"), 100);
    assert_eq!(temp.json(&["reward", "show", &rwd])["stock"], 2);

    temp.kudos()
        .args(&["redemption", "reject", &rdm])
        .fails()
        .stderr_has("invalid transition");
    assert_eq!(temp.balance("student-1"), 100);
    assert_eq!(temp.json(&["reward", "show", &rwd])["stock"], 2);
}

#[test]
fn refund_uses_price_paid_not_current_cost() {
    let temp = Project::empty();
    temp.account("student-1", 100);
    let rwd = temp.reward("Pizza lunch", 30, "2");
    let rdm = temp.redeem("student-1", &rwd, 1);

    temp.kudos()
        .args(&["reward", "update", &rwd, "--cost", "50"])
        .passes();
    temp.kudos()
        .args(&["redemption", "reject", &rdm])
        .passes();

    assert_eq!(temp.balance("student-1"), 100);
}

#[test]
fn approve_then_deliver() {
    let temp = Project::empty();
    temp.account("student-1", 100);
    let rwd = temp.reward("Pizza lunch", 30, "2");
    let rdm = temp.redeem("student-1", &rwd, 1);

    temp.kudos()
        .args(&["redemption", "deliver", &rdm])
        .fails()
        .stderr_has("pending -> delivered");

    temp.kudos()
        .args(&["redemption", "approve", &rdm])
        .passes()
        .stdout_has("approved");
    temp.kudos()
        .args(&["redemption", "deliver", &rdm])
        .passes()
        .stdout_has("delivered");
    temp.kudos()
        .args(&["redemption", "reject", &rdm])
        .fails()
        .stderr_has("delivered -> rejected");

    assert_eq!(temp.balance("student-1"), 70);
}

#[test]
fn list_filters_by_status_and_account() {
    let temp = Project::empty();
    temp.account("student-1", 100);
    temp.account("student-2", 100);
    let rwd = temp.reward("Sticker", 5, "unlimited");
    let first = temp.redeem("student-1", &rwd, 1);
    temp.redeem("student-1", &rwd, 1);
    temp.redeem("student-2", &rwd, 1);
    temp.kudos()
        .args(&["redemption", "approve", &first])
        .passes();

    let pending = temp.json(&["redemption", "list", "--status", "pending"]);
    assert_eq!(pending.as_array().unwrap().len(), 2);

    let mine = temp.json(&["redemption", "list", "--account", "student-1"]);
    assert_eq!(mine.as_array().unwrap().len(), 2);

    let page = temp.json(&["redemption", "list", "--limit", "1"]);
    assert_eq!(page.as_array().unwrap().len(), 1);

    temp.kudos()
        .args(&["redemption", "list", "--status", "lost"])
        .fails()
        .stderr_has("unknown redemption status");
}

#[test]
fn missing_redemption_is_reported() {
    let temp = Project::empty();
    temp.kudos()
        .args(&["redemption", "approve", "rdm-missing"])
        .fails()
        .stderr_has("redemption not found: rdm-missing");
}
