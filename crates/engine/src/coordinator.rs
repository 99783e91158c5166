// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transaction coordinator
//!
//! Every mutation runs as one unit: take the locks of every resource it
//! touches, stage the work, commit it in a single store write. A unit that
//! fails at any step commits nothing.

use crate::locks::{LockKey, LockTable};
use crate::unit::Unit;
use kudos_core::{
    Account, AccountId, Clock, EconomyError, Effect, EntryReason, IdGen, LedgerConfig, NewReward,
    Redemption, RedemptionId, RedemptionStatus, Reward, RewardId, RewardPatch,
};
use kudos_storage::operation::{
    AccountOpenOp, RedemptionCreateOp, RedemptionTransitionOp, RewardCreateOp, RewardDeleteOp,
    RewardUpdateOp,
};
use kudos_storage::{
    datetime_to_micros, LedgerEntry, Operation, RedemptionFilter, Store, StoreError,
};
use tokio::time::Instant;

pub struct Coordinator<S, C, I> {
    store: S,
    clock: C,
    ids: I,
    locks: LockTable,
    config: LedgerConfig,
}

impl<S, C, I> Coordinator<S, C, I>
where
    S: Store,
    C: Clock,
    I: IdGen,
{
    pub fn new(store: S, clock: C, ids: I, config: LedgerConfig) -> Self {
        Self {
            store,
            clock,
            ids,
            locks: LockTable::new(),
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // -- Accounts and points --

    /// Open an account, crediting `opening_balance` in the same unit
    pub async fn open_account(
        &self,
        account: impl Into<AccountId>,
        opening_balance: u64,
    ) -> Result<Account, EconomyError> {
        let id = account.into();
        self.run_unit("open_account", vec![LockKey::Account(id.clone())], |unit| {
            if unit.account(&id).is_some() {
                return Err(EconomyError::AccountExists(id.clone()));
            }
            unit.stage(Operation::AccountOpen(AccountOpenOp {
                account: id.0.clone(),
                opened_at_micros: datetime_to_micros(unit.now()),
            }))?;
            if opening_balance > 0 {
                unit.credit(&id, opening_balance, EntryReason::Opening, None)?;
            }
            unit.account(&id)
                .ok_or_else(|| EconomyError::AccountNotFound(id.clone()))
        })
        .await
    }

    /// Award points to an account, returning the new balance
    pub async fn award_points(
        &self,
        account: &AccountId,
        amount: u64,
        reason: impl Into<String>,
    ) -> Result<u64, EconomyError> {
        let reason = EntryReason::Award(reason.into());
        self.run_unit("award_points", vec![LockKey::Account(account.clone())], |unit| {
            unit.credit(account, amount, reason.clone(), None)
        })
        .await
    }

    /// Take points away from an account, returning the new balance
    pub async fn deduct_points(
        &self,
        account: &AccountId,
        amount: u64,
        reason: impl Into<String>,
    ) -> Result<u64, EconomyError> {
        let reason = EntryReason::Deduction(reason.into());
        self.run_unit("deduct_points", vec![LockKey::Account(account.clone())], |unit| {
            unit.debit(account, amount, reason.clone(), None)
        })
        .await
    }

    /// Committed balance of an account
    pub fn balance(&self, account: &AccountId) -> Result<u64, EconomyError> {
        self.account(account)
            .map(|a| a.balance)
            .ok_or_else(|| EconomyError::AccountNotFound(account.clone()))
    }

    pub fn account(&self, account: &AccountId) -> Option<Account> {
        self.store.read(|s| s.account(account).cloned())
    }

    /// Balance movements of an account, oldest first
    pub fn ledger_history(&self, account: &AccountId) -> Result<Vec<LedgerEntry>, EconomyError> {
        self.store.read(|s| {
            s.account(account)
                .map(|_| s.history(account).to_vec())
                .ok_or_else(|| EconomyError::AccountNotFound(account.clone()))
        })
    }

    // -- Reward catalog --

    pub async fn create_reward(&self, new: NewReward) -> Result<Reward, EconomyError> {
        new.validate()?;
        let id = self.ids.reward_id();
        self.run_unit("create_reward", vec![LockKey::Reward(id.clone())], |unit| {
            if unit.reward(&id).is_some() {
                return Err(EconomyError::RewardExists(id.clone()));
            }
            unit.stage(Operation::RewardCreate(RewardCreateOp {
                id: id.0.clone(),
                name: new.name.clone(),
                description: new.description.clone(),
                cost: new.cost,
                stock: new.stock,
                active: new.active,
                created_at_micros: datetime_to_micros(unit.now()),
            }))?;
            unit.get_reward(&id)
        })
        .await
    }

    /// Edit a reward in place
    ///
    /// Existing redemptions keep the points they were charged.
    pub async fn update_reward(
        &self,
        id: &RewardId,
        patch: RewardPatch,
    ) -> Result<Reward, EconomyError> {
        patch.validate()?;
        self.run_unit("update_reward", vec![LockKey::Reward(id.clone())], |unit| {
            let current = unit.get_reward(id)?;
            if patch.is_empty() {
                return Ok(current);
            }
            unit.stage(Operation::RewardUpdate(RewardUpdateOp {
                id: id.0.clone(),
                patch: patch.clone(),
                updated_at_micros: datetime_to_micros(unit.now()),
            }))?;
            unit.get_reward(id)
        })
        .await
    }

    /// Remove a reward that no pending redemption references
    pub async fn delete_reward(&self, id: &RewardId) -> Result<Reward, EconomyError> {
        self.run_unit("delete_reward", vec![LockKey::Reward(id.clone())], |unit| {
            let current = unit.get_reward(id)?;
            let pending = unit.pending_redemptions_for(id);
            if pending > 0 {
                return Err(EconomyError::RewardInUse {
                    reward: id.clone(),
                    pending,
                });
            }
            unit.stage(Operation::RewardDelete(RewardDeleteOp { id: id.0.clone() }))?;
            Ok(current)
        })
        .await
    }

    pub fn reward(&self, id: &RewardId) -> Option<Reward> {
        self.store.read(|s| s.reward(id).cloned())
    }

    pub fn list_rewards(&self, active_only: bool) -> Vec<Reward> {
        self.store.read(|s| s.list_rewards(active_only))
    }

    // -- Redemptions --

    /// Claim `quantity` units of a reward for an account
    ///
    /// Debits the account, reserves stock and records a pending redemption
    /// as one unit. On any failure balance and stock are left untouched.
    pub async fn create_redemption(
        &self,
        account: &AccountId,
        reward: &RewardId,
        quantity: u32,
    ) -> Result<Redemption, EconomyError> {
        let id = self.ids.redemption_id();
        let keys = vec![
            LockKey::Account(account.clone()),
            LockKey::Reward(reward.clone()),
        ];
        self.run_unit("create_redemption", keys, |unit| {
            let current = unit.get_reward(reward)?;
            if unit.account(account).is_none() {
                return Err(EconomyError::AccountNotFound(account.clone()));
            }
            let (redemption, effects) =
                Redemption::claim(id.clone(), account.clone(), &current, quantity, &self.clock)?;
            execute(unit, &effects)?;
            unit.stage(Operation::RedemptionCreate(RedemptionCreateOp {
                id: redemption.id.0.clone(),
                account: redemption.account.0.clone(),
                reward: redemption.reward.0.clone(),
                quantity: redemption.quantity,
                points_spent: redemption.points_spent,
                created_at_micros: datetime_to_micros(redemption.created_at),
            }))?;
            unit.redemption(&id)
                .ok_or_else(|| EconomyError::RedemptionNotFound(id.clone()))
        })
        .await
    }

    /// Move a redemption to `status`
    ///
    /// The current status is read under the redemption's lock, so a
    /// rejection compensates at most once no matter how many race.
    pub async fn set_redemption_status(
        &self,
        id: &RedemptionId,
        status: RedemptionStatus,
    ) -> Result<Redemption, EconomyError> {
        // Account and reward never change after creation
        let (account, reward) = self
            .store
            .read(|s| {
                s.redemption(id)
                    .map(|r| (r.account.clone(), r.reward.clone()))
            })
            .ok_or_else(|| EconomyError::RedemptionNotFound(id.clone()))?;
        let keys = vec![
            LockKey::Redemption(id.clone()),
            LockKey::Account(account),
            LockKey::Reward(reward),
        ];
        self.run_unit("set_redemption_status", keys, |unit| {
            let current = unit
                .redemption(id)
                .ok_or_else(|| EconomyError::RedemptionNotFound(id.clone()))?;
            let (next, effects) = current.transition(status, &self.clock)?;
            execute(unit, &effects)?;
            unit.stage(Operation::RedemptionTransition(RedemptionTransitionOp {
                id: id.0.clone(),
                from: current.status,
                to: next.status,
                updated_at_micros: datetime_to_micros(next.updated_at),
            }))?;
            unit.redemption(id)
                .ok_or_else(|| EconomyError::RedemptionNotFound(id.clone()))
        })
        .await
    }

    pub async fn approve(&self, id: &RedemptionId) -> Result<Redemption, EconomyError> {
        self.set_redemption_status(id, RedemptionStatus::Approved)
            .await
    }

    pub async fn reject(&self, id: &RedemptionId) -> Result<Redemption, EconomyError> {
        self.set_redemption_status(id, RedemptionStatus::Rejected)
            .await
    }

    pub async fn deliver(&self, id: &RedemptionId) -> Result<Redemption, EconomyError> {
        self.set_redemption_status(id, RedemptionStatus::Delivered)
            .await
    }

    pub fn redemption(&self, id: &RedemptionId) -> Option<Redemption> {
        self.store.read(|s| s.redemption(id).cloned())
    }

    /// Redemptions matching `filter`, newest first
    pub fn list_redemptions(&self, filter: &RedemptionFilter) -> Vec<Redemption> {
        self.store.read(|s| s.query_redemptions(filter))
    }

    /// Run `body` as one atomic unit holding the locks for `keys`
    ///
    /// A version conflict at commit re-runs the body against fresh state,
    /// up to `commit_retries` times and never past the lock deadline.
    async fn run_unit<T>(
        &self,
        operation: &'static str,
        keys: Vec<LockKey>,
        mut body: impl FnMut(&mut Unit<'_, S>) -> Result<T, EconomyError>,
    ) -> Result<T, EconomyError> {
        let start = std::time::Instant::now();
        let deadline = Instant::now() + self.config.lock_timeout;
        let _locks = self.locks.acquire(keys, deadline).await?;

        let mut attempt = 0u32;
        let result = loop {
            let mut unit = Unit::new(&self.store, self.clock.now());
            let value = match body(&mut unit) {
                Ok(value) => value,
                Err(e) => break Err(e),
            };
            let commit = unit.into_commit();
            match off_worker(|| self.store.commit(commit)) {
                Ok(sequence) => {
                    tracing::info!(
                        operation,
                        sequence,
                        attempt,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "unit committed"
                    );
                    break Ok(value);
                }
                Err(StoreError::Conflict { key, .. })
                    if attempt < self.config.commit_retries && Instant::now() < deadline =>
                {
                    attempt += 1;
                    tracing::warn!(operation, %key, attempt, "version conflict, retrying unit");
                    tokio::task::yield_now().await;
                }
                Err(e) => break Err(EconomyError::from(e)),
            }
        };

        if let Err(e) = &result {
            tracing::debug!(operation, kind = e.kind(), error = %e, "unit rejected");
        }
        result
    }
}

/// Run a blocking store call
///
/// On a multi-threaded runtime the worker hands its other tasks off first,
/// so an fsync does not stall them. A current-thread runtime has nowhere to
/// hand them, and runs the call in place.
fn off_worker<T>(call: impl FnOnce() -> T) -> T {
    use tokio::runtime::{Handle, RuntimeFlavor};

    match Handle::try_current().map(|handle| handle.runtime_flavor()) {
        Ok(RuntimeFlavor::MultiThread) => tokio::task::block_in_place(call),
        _ => call(),
    }
}

/// Carry out state machine effects inside a unit
fn execute<S: Store>(unit: &mut Unit<'_, S>, effects: &[Effect]) -> Result<(), EconomyError> {
    for effect in effects {
        tracing::trace!(effect = effect.name(), "executing effect");
        match effect {
            Effect::DebitPoints {
                account,
                amount,
                redemption,
            } => {
                unit.debit(account, *amount, EntryReason::Redemption, Some(redemption))?;
            }
            Effect::CreditPoints {
                account,
                amount,
                redemption,
            } => {
                unit.credit(account, *amount, EntryReason::Refund, Some(redemption))?;
            }
            Effect::ReserveStock { reward, quantity } => {
                unit.reserve_stock(reward, *quantity)?;
            }
            Effect::ReleaseStock { reward, quantity } => {
                unit.release_stock(reward, *quantity)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
