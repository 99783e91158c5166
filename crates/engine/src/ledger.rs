// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Points ledger
//!
//! Credits and debits are checked and applied in one step against the
//! unit's staged copy of the account. There is no separate "has enough"
//! query to race against.

use crate::unit::Unit;
use kudos_core::{AccountId, EconomyError, EntryReason, RedemptionId};
use kudos_storage::operation::PointsOp;
use kudos_storage::{datetime_to_micros, Operation, Store};

impl<S: Store> Unit<'_, S> {
    /// Add points to an account, returning the new balance
    pub fn credit(
        &mut self,
        account: &AccountId,
        amount: u64,
        reason: EntryReason,
        redemption: Option<&RedemptionId>,
    ) -> Result<u64, EconomyError> {
        let current = self
            .account(account)
            .ok_or_else(|| EconomyError::AccountNotFound(account.clone()))?;
        let balance = current.credited(amount)?.balance;
        let op = self.points_op(account, amount, reason, redemption);
        self.stage(Operation::PointsCredit(op))?;
        Ok(balance)
    }

    /// Take points from an account, returning the new balance
    ///
    /// Fails with `InsufficientFunds` rather than going below zero.
    pub fn debit(
        &mut self,
        account: &AccountId,
        amount: u64,
        reason: EntryReason,
        redemption: Option<&RedemptionId>,
    ) -> Result<u64, EconomyError> {
        let current = self
            .account(account)
            .ok_or_else(|| EconomyError::AccountNotFound(account.clone()))?;
        let balance = current.debited(amount)?.balance;
        let op = self.points_op(account, amount, reason, redemption);
        self.stage(Operation::PointsDebit(op))?;
        Ok(balance)
    }

    fn points_op(
        &self,
        account: &AccountId,
        amount: u64,
        reason: EntryReason,
        redemption: Option<&RedemptionId>,
    ) -> PointsOp {
        PointsOp {
            account: account.0.clone(),
            amount,
            reason,
            redemption: redemption.map(|r| r.0.clone()),
            at_micros: datetime_to_micros(self.now()),
        }
    }
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
