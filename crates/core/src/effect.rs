// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effects requested by the redemption state machine
//!
//! The state machine never touches balances or stock itself. It returns the
//! ledger and stock movements a transition implies, and the coordinator
//! executes them inside the same atomic unit as the status write.

use crate::account::AccountId;
use crate::redemption::RedemptionId;
use crate::reward::RewardId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Take points from an account to pay for a redemption
    DebitPoints {
        account: AccountId,
        amount: u64,
        redemption: RedemptionId,
    },
    /// Return the points a redemption spent
    CreditPoints {
        account: AccountId,
        amount: u64,
        redemption: RedemptionId,
    },
    /// Take units out of a reward's stock
    ReserveStock { reward: RewardId, quantity: u32 },
    /// Put units back into a reward's stock
    ReleaseStock { reward: RewardId, quantity: u32 },
}

impl Effect {
    /// Effect name for log fields
    pub fn name(&self) -> &'static str {
        match self {
            Effect::DebitPoints { .. } => "debit_points",
            Effect::CreditPoints { .. } => "credit_points",
            Effect::ReserveStock { .. } => "reserve_stock",
            Effect::ReleaseStock { .. } => "release_stock",
        }
    }
}
