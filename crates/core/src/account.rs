// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Point accounts
//!
//! An account is opened alongside its owning user and is never deleted.
//! Balances are unsigned, and the checked arithmetic here is the only way
//! a balance changes, so a negative balance is unrepresentable.

use crate::error::EconomyError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of the user owning an account
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(pub String);

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        AccountId(s)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        AccountId(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub balance: u64,
    pub opened_at: DateTime<Utc>,
    /// Bumped by every committed change, used for conflict detection
    pub version: u64,
}

impl Account {
    pub fn new(id: impl Into<AccountId>, opened_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            balance: 0,
            opened_at,
            version: 0,
        }
    }

    /// Balance after crediting `amount`
    pub fn credited(&self, amount: u64) -> Result<Account, EconomyError> {
        if amount == 0 {
            return Err(EconomyError::InvalidAmount(
                "credit amount must be positive".to_string(),
            ));
        }
        let balance = self.balance.checked_add(amount).ok_or_else(|| {
            EconomyError::InvalidAmount(format!("credit of {} overflows balance", amount))
        })?;
        Ok(Account {
            balance,
            ..self.clone()
        })
    }

    /// Balance after debiting `amount`, refused rather than going negative
    pub fn debited(&self, amount: u64) -> Result<Account, EconomyError> {
        if amount == 0 {
            return Err(EconomyError::InvalidAmount(
                "debit amount must be positive".to_string(),
            ));
        }
        let balance =
            self.balance
                .checked_sub(amount)
                .ok_or_else(|| EconomyError::InsufficientFunds {
                    account: self.id.clone(),
                    balance: self.balance,
                    requested: amount,
                })?;
        Ok(Account {
            balance,
            ..self.clone()
        })
    }
}

/// Why a ledger entry was written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "note", rename_all = "snake_case")]
pub enum EntryReason {
    /// Balance given when the account was opened
    Opening,
    /// Points awarded by a teacher
    Award(String),
    /// Points taken away by a teacher
    Deduction(String),
    /// Points spent on a redemption
    Redemption,
    /// Points returned by a rejected redemption
    Refund,
}

impl std::fmt::Display for EntryReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryReason::Opening => write!(f, "opening balance"),
            EntryReason::Award(note) => write!(f, "award: {}", note),
            EntryReason::Deduction(note) => write!(f, "deduction: {}", note),
            EntryReason::Redemption => write!(f, "redemption"),
            EntryReason::Refund => write!(f, "refund"),
        }
    }
}
