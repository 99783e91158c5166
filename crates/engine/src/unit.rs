// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic unit of work
//!
//! A unit stages reads and writes against a private copy of the records it
//! touches. Nothing it does is visible to anyone else until the store
//! accepts its commit, and a unit that is dropped leaves no trace.

use chrono::{DateTime, Utc};
use kudos_core::{
    Account, AccountId, EconomyError, Redemption, RedemptionId, Reward, RewardId,
};
use kudos_storage::{ApplyError, Commit, MaterializedState, Operation, RecordKey, Store};
use std::collections::HashSet;

pub struct Unit<'s, S> {
    store: &'s S,
    now: DateTime<Utc>,
    staged: MaterializedState,
    loaded: HashSet<RecordKey>,
    commit: Commit,
}

impl<'s, S: Store> Unit<'s, S> {
    pub(crate) fn new(store: &'s S, now: DateTime<Utc>) -> Self {
        Self {
            store,
            now,
            staged: MaterializedState::new(),
            loaded: HashSet::new(),
            commit: Commit::new(),
        }
    }

    /// Timestamp shared by every write in the unit
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Account as the unit currently sees it
    pub fn account(&mut self, id: &AccountId) -> Option<Account> {
        self.load(RecordKey::Account(id.clone()));
        self.staged.account(id).cloned()
    }

    pub fn reward(&mut self, id: &RewardId) -> Option<Reward> {
        self.load(RecordKey::Reward(id.clone()));
        self.staged.reward(id).cloned()
    }

    pub fn redemption(&mut self, id: &RedemptionId) -> Option<Redemption> {
        self.load(RecordKey::Redemption(id.clone()));
        self.staged.redemption(id).cloned()
    }

    /// Pending redemptions against a reward, from committed state
    ///
    /// Only stable while the caller holds the reward's lock.
    pub fn pending_redemptions_for(&self, reward: &RewardId) -> usize {
        self.store.read(|s| s.pending_redemptions_for(reward))
    }

    /// Apply `op` to the staged records and queue it for commit
    ///
    /// On error the staged records are unchanged.
    pub(crate) fn stage(&mut self, op: Operation) -> Result<(), EconomyError> {
        self.load(op.record_key());
        self.staged.apply(&op).map_err(rejected)?;
        self.commit.push(op);
        Ok(())
    }

    pub(crate) fn into_commit(self) -> Commit {
        self.commit
    }

    /// Copy a committed record into the staging area on first touch and
    /// remember the version it was read at
    fn load(&mut self, key: RecordKey) {
        if self.loaded.contains(&key) {
            return;
        }
        let version = match &key {
            RecordKey::Account(id) => {
                let found = self.store.read(|s| s.account(id).cloned());
                let version = found.as_ref().map(|a| a.version).unwrap_or(0);
                if let Some(account) = found {
                    self.staged.accounts.insert(id.clone(), account);
                }
                version
            }
            RecordKey::Reward(id) => {
                let found = self.store.read(|s| s.reward(id).cloned());
                let version = found.as_ref().map(|r| r.version).unwrap_or(0);
                if let Some(reward) = found {
                    self.staged.rewards.insert(id.clone(), reward);
                }
                version
            }
            RecordKey::Redemption(id) => {
                let found = self.store.read(|s| s.redemption(id).cloned());
                let version = found.as_ref().map(|r| r.version).unwrap_or(0);
                if let Some(redemption) = found {
                    self.staged.redemptions.insert(id.clone(), redemption);
                }
                version
            }
        };
        self.commit.expect(key.clone(), version);
        self.loaded.insert(key);
    }
}

/// Map a staging failure to the caller-facing error
fn rejected(e: ApplyError) -> EconomyError {
    match e {
        ApplyError::Invariant(inner) => inner,
        ApplyError::NotFound { kind: "account", id } => EconomyError::AccountNotFound(id.into()),
        ApplyError::NotFound { kind: "reward", id } => EconomyError::RewardNotFound(id.into()),
        ApplyError::NotFound { kind: "redemption", id } => {
            EconomyError::RedemptionNotFound(id.into())
        }
        ApplyError::AlreadyExists { kind: "account", id } => {
            EconomyError::AccountExists(id.into())
        }
        ApplyError::AlreadyExists { kind: "reward", id } => EconomyError::RewardExists(id.into()),
        other => EconomyError::StorageUnavailable(other.to_string()),
    }
}

#[cfg(test)]
#[path = "unit_tests.rs"]
mod tests;
