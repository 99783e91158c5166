// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state from WAL replay
//!
//! The in-memory view of every account, reward and redemption. It only ever
//! holds committed data: operations are applied after their WAL entry is
//! durable, so readers never see an in-flight unit.

use crate::operation::*;
use chrono::{DateTime, TimeZone, Utc};
use kudos_core::{
    Account, AccountId, EconomyError, EntryReason, Redemption, RedemptionId, RedemptionStatus,
    Reward, RewardId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Error applying an operation to state
#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("entity not found: {kind} {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("entity already exists: {kind} {id}")]
    AlreadyExists { kind: &'static str, id: String },
    #[error("invalid state transition: {0}")]
    InvalidTransition(String),
    #[error("invariant violated: {0}")]
    Invariant(#[from] EconomyError),
    #[error("timestamp out of range: {0} µs")]
    InvalidTimestamp(i64),
}

/// Identity of a versioned record
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKey {
    Account(AccountId),
    Reward(RewardId),
    Redemption(RedemptionId),
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKey::Account(id) => write!(f, "account {}", id),
            RecordKey::Reward(id) => write!(f, "reward {}", id),
            RecordKey::Redemption(id) => write!(f, "redemption {}", id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Credit,
    Debit,
}

/// One balance movement, kept for the account's history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Position in the global order of ledger movements
    pub sequence: u64,
    pub account: AccountId,
    pub kind: EntryKind,
    pub amount: u64,
    pub balance_after: u64,
    pub reason: EntryReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redemption: Option<RedemptionId>,
    pub at: DateTime<Utc>,
}

/// Full economy state materialized from the WAL
#[derive(Debug, Clone, Default)]
pub struct MaterializedState {
    pub accounts: HashMap<AccountId, Account>,
    pub rewards: HashMap<RewardId, Reward>,
    pub redemptions: HashMap<RedemptionId, Redemption>,
    history: HashMap<AccountId, Vec<LedgerEntry>>,
    next_entry: u64,
}

impl MaterializedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account(&self, id: &AccountId) -> Option<&Account> {
        self.accounts.get(id)
    }

    pub fn reward(&self, id: &RewardId) -> Option<&Reward> {
        self.rewards.get(id)
    }

    pub fn redemption(&self, id: &RedemptionId) -> Option<&Redemption> {
        self.redemptions.get(id)
    }

    /// Ledger movements of an account, oldest first
    pub fn history(&self, id: &AccountId) -> &[LedgerEntry] {
        self.history.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Committed version of a record, 0 if it does not exist
    pub fn version(&self, key: &RecordKey) -> u64 {
        match key {
            RecordKey::Account(id) => self.accounts.get(id).map(|a| a.version),
            RecordKey::Reward(id) => self.rewards.get(id).map(|r| r.version),
            RecordKey::Redemption(id) => self.redemptions.get(id).map(|r| r.version),
        }
        .unwrap_or(0)
    }

    /// Number of pending redemptions against a reward
    pub fn pending_redemptions_for(&self, reward: &RewardId) -> usize {
        self.redemptions
            .values()
            .filter(|r| &r.reward == reward && r.is_pending())
            .count()
    }

    /// Check that a batch would apply cleanly, without changing anything
    ///
    /// Runs the batch against a copy of just the records it touches.
    pub fn check(&self, operations: &[Operation]) -> Result<(), ApplyError> {
        let mut scratch = self.scoped(operations);
        for op in operations {
            scratch.apply(op)?;
        }
        Ok(())
    }

    /// Apply a batch that has already passed `check`
    pub fn apply_all(&mut self, operations: &[Operation]) -> Result<(), ApplyError> {
        for op in operations {
            self.apply(op)?;
        }
        Ok(())
    }

    fn scoped(&self, operations: &[Operation]) -> MaterializedState {
        let mut scratch = MaterializedState::new();
        for op in operations {
            match op.record_key() {
                RecordKey::Account(id) => {
                    if let Some(account) = self.accounts.get(&id) {
                        scratch.accounts.insert(id, account.clone());
                    }
                }
                RecordKey::Reward(id) => {
                    if let Some(reward) = self.rewards.get(&id) {
                        scratch.rewards.insert(id, reward.clone());
                    }
                }
                RecordKey::Redemption(id) => {
                    if let Some(redemption) = self.redemptions.get(&id) {
                        scratch.redemptions.insert(id, redemption.clone());
                    }
                }
            }
        }
        scratch
    }

    /// Apply a single operation to the state
    pub fn apply(&mut self, op: &Operation) -> Result<(), ApplyError> {
        match op {
            Operation::AccountOpen(open) => {
                let id = AccountId(open.account.clone());
                if self.accounts.contains_key(&id) {
                    return Err(ApplyError::AlreadyExists {
                        kind: "account",
                        id: open.account.clone(),
                    });
                }
                let opened_at = micros_to_datetime(open.opened_at_micros)?;
                let mut account = Account::new(id.clone(), opened_at);
                account.version = 1;
                self.accounts.insert(id, account);
            }

            Operation::PointsCredit(points) => self.move_points(points, EntryKind::Credit)?,
            Operation::PointsDebit(points) => self.move_points(points, EntryKind::Debit)?,

            Operation::RewardCreate(create) => {
                let id = RewardId(create.id.clone());
                if self.rewards.contains_key(&id) {
                    return Err(ApplyError::AlreadyExists {
                        kind: "reward",
                        id: create.id.clone(),
                    });
                }
                let created_at = micros_to_datetime(create.created_at_micros)?;
                self.rewards.insert(
                    id.clone(),
                    Reward {
                        id,
                        name: create.name.clone(),
                        description: create.description.clone(),
                        cost: create.cost,
                        stock: create.stock,
                        active: create.active,
                        created_at,
                        updated_at: created_at,
                        version: 1,
                    },
                );
            }

            Operation::RewardUpdate(update) => {
                let updated_at = micros_to_datetime(update.updated_at_micros)?;
                let reward = self.reward_mut(&update.id)?;
                let mut updated = update.patch.applied_to(reward, updated_at);
                updated.version = reward.version + 1;
                *reward = updated;
            }

            Operation::RewardDelete(delete) => {
                if self.rewards.remove(&RewardId(delete.id.clone())).is_none() {
                    return Err(ApplyError::NotFound {
                        kind: "reward",
                        id: delete.id.clone(),
                    });
                }
            }

            Operation::StockReserve(stock) => {
                let reward = self.reward_mut(&stock.reward)?;
                let mut updated = reward.reserved(stock.quantity)?;
                updated.version = reward.version + 1;
                *reward = updated;
            }

            Operation::StockRelease(stock) => {
                let reward = self.reward_mut(&stock.reward)?;
                let mut updated = reward.released(stock.quantity);
                updated.version = reward.version + 1;
                *reward = updated;
            }

            Operation::RedemptionCreate(create) => {
                let id = RedemptionId(create.id.clone());
                if self.redemptions.contains_key(&id) {
                    return Err(ApplyError::AlreadyExists {
                        kind: "redemption",
                        id: create.id.clone(),
                    });
                }
                let created_at = micros_to_datetime(create.created_at_micros)?;
                self.redemptions.insert(
                    id.clone(),
                    Redemption {
                        id,
                        account: AccountId(create.account.clone()),
                        reward: RewardId(create.reward.clone()),
                        quantity: create.quantity,
                        points_spent: create.points_spent,
                        status: RedemptionStatus::Pending,
                        created_at,
                        updated_at: created_at,
                        version: 1,
                    },
                );
            }

            Operation::RedemptionTransition(transition) => {
                let updated_at = micros_to_datetime(transition.updated_at_micros)?;
                let redemption = self
                    .redemptions
                    .get_mut(&RedemptionId(transition.id.clone()))
                    .ok_or_else(|| ApplyError::NotFound {
                        kind: "redemption",
                        id: transition.id.clone(),
                    })?;
                if redemption.status != transition.from
                    || !transition.from.can_transition_to(transition.to)
                {
                    return Err(ApplyError::InvalidTransition(format!(
                        "redemption {} is {}, cannot move {} -> {}",
                        transition.id, redemption.status, transition.from, transition.to
                    )));
                }
                redemption.status = transition.to;
                redemption.updated_at = updated_at;
                redemption.version += 1;
            }
        }
        Ok(())
    }

    fn reward_mut(&mut self, id: &str) -> Result<&mut Reward, ApplyError> {
        self.rewards
            .get_mut(&RewardId(id.to_string()))
            .ok_or_else(|| ApplyError::NotFound {
                kind: "reward",
                id: id.to_string(),
            })
    }

    fn move_points(&mut self, points: &PointsOp, kind: EntryKind) -> Result<(), ApplyError> {
        let at = micros_to_datetime(points.at_micros)?;
        let id = AccountId(points.account.clone());
        let account = self
            .accounts
            .get_mut(&id)
            .ok_or_else(|| ApplyError::NotFound {
                kind: "account",
                id: points.account.clone(),
            })?;
        let mut updated = match kind {
            EntryKind::Credit => account.credited(points.amount)?,
            EntryKind::Debit => account.debited(points.amount)?,
        };
        updated.version = account.version + 1;
        let balance_after = updated.balance;
        *account = updated;

        let entry = LedgerEntry {
            sequence: self.next_entry,
            account: id.clone(),
            kind,
            amount: points.amount,
            balance_after,
            reason: points.reason.clone(),
            redemption: points.redemption.clone().map(RedemptionId),
            at,
        };
        self.next_entry += 1;
        self.history.entry(id).or_default().push(entry);
        Ok(())
    }
}

impl Operation {
    /// The record this operation writes
    pub fn record_key(&self) -> RecordKey {
        match self {
            Operation::AccountOpen(open) => RecordKey::Account(AccountId(open.account.clone())),
            Operation::PointsCredit(points) | Operation::PointsDebit(points) => {
                RecordKey::Account(AccountId(points.account.clone()))
            }
            Operation::RewardCreate(create) => RecordKey::Reward(RewardId(create.id.clone())),
            Operation::RewardUpdate(update) => RecordKey::Reward(RewardId(update.id.clone())),
            Operation::RewardDelete(delete) => RecordKey::Reward(RewardId(delete.id.clone())),
            Operation::StockReserve(stock) | Operation::StockRelease(stock) => {
                RecordKey::Reward(RewardId(stock.reward.clone()))
            }
            Operation::RedemptionCreate(create) => {
                RecordKey::Redemption(RedemptionId(create.id.clone()))
            }
            Operation::RedemptionTransition(transition) => {
                RecordKey::Redemption(RedemptionId(transition.id.clone()))
            }
        }
    }
}

/// Decode a WAL timestamp; values outside chrono's range are rejected
pub fn micros_to_datetime(micros: i64) -> Result<DateTime<Utc>, ApplyError> {
    Utc.timestamp_micros(micros)
        .single()
        .ok_or(ApplyError::InvalidTimestamp(micros))
}

pub fn datetime_to_micros(at: DateTime<Utc>) -> i64 {
    at.timestamp_micros()
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
