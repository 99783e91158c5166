// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WAL operation types
//!
//! Every change to accounts, rewards and redemptions is one of these
//! operations. A commit groups several of them into one WAL entry, and
//! replaying the entries in order rebuilds the state.

use kudos_core::{EntryReason, RedemptionStatus, RewardPatch, Stock};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    // Ledger operations
    AccountOpen(AccountOpenOp),
    PointsCredit(PointsOp),
    PointsDebit(PointsOp),

    // Catalog operations
    RewardCreate(RewardCreateOp),
    RewardUpdate(RewardUpdateOp),
    RewardDelete(RewardDeleteOp),
    StockReserve(StockOp),
    StockRelease(StockOp),

    // Redemption operations
    RedemptionCreate(RedemptionCreateOp),
    RedemptionTransition(RedemptionTransitionOp),
}

impl Operation {
    /// Operation name for log fields
    pub fn name(&self) -> &'static str {
        match self {
            Operation::AccountOpen(_) => "account_open",
            Operation::PointsCredit(_) => "points_credit",
            Operation::PointsDebit(_) => "points_debit",
            Operation::RewardCreate(_) => "reward_create",
            Operation::RewardUpdate(_) => "reward_update",
            Operation::RewardDelete(_) => "reward_delete",
            Operation::StockReserve(_) => "stock_reserve",
            Operation::StockRelease(_) => "stock_release",
            Operation::RedemptionCreate(_) => "redemption_create",
            Operation::RedemptionTransition(_) => "redemption_transition",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountOpenOp {
    pub account: String,
    pub opened_at_micros: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsOp {
    pub account: String,
    pub amount: u64,
    pub reason: EntryReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redemption: Option<String>,
    pub at_micros: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardCreateOp {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub cost: u64,
    pub stock: Stock,
    pub active: bool,
    pub created_at_micros: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardUpdateOp {
    pub id: String,
    pub patch: RewardPatch,
    pub updated_at_micros: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardDeleteOp {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockOp {
    pub reward: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionCreateOp {
    pub id: String,
    pub account: String,
    pub reward: String,
    pub quantity: u32,
    pub points_spent: u64,
    pub created_at_micros: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionTransitionOp {
    pub id: String,
    pub from: RedemptionStatus,
    pub to: RedemptionStatus,
    pub updated_at_micros: i64,
}
