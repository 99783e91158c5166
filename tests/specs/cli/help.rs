//! Help output specs

use crate::prelude::*;

#[test]
fn help_lists_command_groups() {
    let temp = Project::empty();
    temp.kudos()
        .args(&["--help"])
        .passes()
        .stdout_has("account")
        .stdout_has("reward")
        .stdout_has("redeem")
        .stdout_has("redemption")
        .stdout_has("repair");
}

#[test]
fn version_flag_prints_version() {
    let temp = Project::empty();
    temp.kudos()
        .args(&["--version"])
        .passes()
        .stdout_has("kudos");
}

#[test]
fn redemption_help_lists_decisions() {
    let temp = Project::empty();
    temp.kudos()
        .args(&["redemption", "--help"])
        .passes()
        .stdout_has("approve")
        .stdout_has("reject")
        .stdout_has("deliver");
}
