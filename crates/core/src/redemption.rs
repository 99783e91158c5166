// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Redemption state machine
//!
//! A redemption is one claim of a reward by an account. It is created
//! `pending` with its points already spent and stock already reserved, and
//! then moves through the approval workflow:
//!
//! ```text
//! pending ──approve──▶ approved ──deliver──▶ delivered
//!    │
//!    └────reject────▶ rejected   (refund points, restock)
//! ```
//!
//! `rejected` and `delivered` are final. Only `pending → rejected` carries
//! compensation, so compensating twice would need a second transition out of
//! `pending`, which the table does not allow.

use crate::account::AccountId;
use crate::clock::Clock;
use crate::effect::Effect;
use crate::error::EconomyError;
use crate::reward::{Reward, RewardId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a redemption
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RedemptionId(pub String);

impl std::fmt::Display for RedemptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RedemptionId {
    fn from(s: String) -> Self {
        RedemptionId(s)
    }
}

impl From<&str> for RedemptionId {
    fn from(s: &str) -> Self {
        RedemptionId(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedemptionStatus {
    Pending,
    Approved,
    Rejected,
    Delivered,
}

impl RedemptionStatus {
    pub const ALL: [RedemptionStatus; 4] = [
        RedemptionStatus::Pending,
        RedemptionStatus::Approved,
        RedemptionStatus::Rejected,
        RedemptionStatus::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RedemptionStatus::Pending => "pending",
            RedemptionStatus::Approved => "approved",
            RedemptionStatus::Rejected => "rejected",
            RedemptionStatus::Delivered => "delivered",
        }
    }

    /// The single source of truth for legal status changes
    pub fn can_transition_to(self, next: RedemptionStatus) -> bool {
        matches!(
            (self, next),
            (RedemptionStatus::Pending, RedemptionStatus::Approved)
                | (RedemptionStatus::Pending, RedemptionStatus::Rejected)
                | (RedemptionStatus::Approved, RedemptionStatus::Delivered)
        )
    }

    /// No status can be reached from here
    pub fn is_final(self) -> bool {
        Self::ALL.iter().all(|next| !self.can_transition_to(*next))
    }
}

impl std::fmt::Display for RedemptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RedemptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RedemptionStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown redemption status '{}': expected pending, approved, rejected or delivered",
                    s
                )
            })
    }
}

/// One claim against a reward
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redemption {
    pub id: RedemptionId,
    pub account: AccountId,
    pub reward: RewardId,
    pub quantity: u32,
    /// Cost × quantity at claim time. Refunds use this, never the current cost.
    pub points_spent: u64,
    pub status: RedemptionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u64,
}

impl Redemption {
    /// Open a claim on `reward`, returning the pending redemption and the
    /// debit/reservation it requires
    ///
    /// Checks the reward is active and prices the claim. Balance and stock
    /// sufficiency are checked when the effects are executed.
    pub fn claim(
        id: RedemptionId,
        account: AccountId,
        reward: &Reward,
        quantity: u32,
        clock: &impl Clock,
    ) -> Result<(Redemption, Vec<Effect>), EconomyError> {
        if !reward.active {
            return Err(EconomyError::RewardInactive(reward.id.clone()));
        }
        let points_spent = reward.price(quantity)?;
        let now = clock.now();

        let effects = vec![
            Effect::DebitPoints {
                account: account.clone(),
                amount: points_spent,
                redemption: id.clone(),
            },
            Effect::ReserveStock {
                reward: reward.id.clone(),
                quantity,
            },
        ];
        let redemption = Redemption {
            id,
            account,
            reward: reward.id.clone(),
            quantity,
            points_spent,
            status: RedemptionStatus::Pending,
            created_at: now,
            updated_at: now,
            version: 0,
        };
        Ok((redemption, effects))
    }

    /// Move to `next`, returning the updated redemption and any compensation
    pub fn transition(
        &self,
        next: RedemptionStatus,
        clock: &impl Clock,
    ) -> Result<(Redemption, Vec<Effect>), EconomyError> {
        if !self.status.can_transition_to(next) {
            return Err(EconomyError::InvalidTransition {
                id: self.id.clone(),
                from: self.status,
                to: next,
            });
        }

        let effects = match next {
            RedemptionStatus::Rejected => vec![
                Effect::CreditPoints {
                    account: self.account.clone(),
                    amount: self.points_spent,
                    redemption: self.id.clone(),
                },
                Effect::ReleaseStock {
                    reward: self.reward.clone(),
                    quantity: self.quantity,
                },
            ],
            _ => vec![],
        };

        let redemption = Redemption {
            status: next,
            updated_at: clock.now(),
            ..self.clone()
        };
        Ok((redemption, effects))
    }

    pub fn is_pending(&self) -> bool {
        self.status == RedemptionStatus::Pending
    }

    pub fn is_final(&self) -> bool {
        self.status.is_final()
    }
}

#[cfg(test)]
#[path = "redemption_tests.rs"]
mod tests;
