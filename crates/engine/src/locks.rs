// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-resource exclusive locks
//!
//! Every unit that writes an account, reward or redemption holds that
//! resource's lock from its first read to its commit. Locks are always
//! taken in `LockKey` order, so two units can never wait on each other.

use kudos_core::{AccountId, EconomyError, RedemptionId, RewardId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tokio::time::Instant;

/// Slots kept before idle ones are dropped
const PRUNE_THRESHOLD: usize = 1024;

/// A lockable resource. Variant order is acquisition order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LockKey {
    Redemption(RedemptionId),
    Account(AccountId),
    Reward(RewardId),
}

impl std::fmt::Display for LockKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LockKey::Redemption(id) => write!(f, "redemption {}", id),
            LockKey::Account(id) => write!(f, "account {}", id),
            LockKey::Reward(id) => write!(f, "reward {}", id),
        }
    }
}

/// Guards held by one unit; dropping releases them all
#[derive(Debug)]
pub struct LockSet {
    keys: Vec<LockKey>,
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl LockSet {
    pub fn keys(&self) -> &[LockKey] {
        &self.keys
    }
}

#[derive(Debug, Default)]
pub struct LockTable {
    slots: Mutex<HashMap<LockKey, Arc<AsyncMutex<()>>>>,
}

impl LockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire every key, in order, before `deadline`
    ///
    /// Fails with `Busy` naming the first resource that could not be
    /// taken in time. Guards taken so far are released on failure.
    pub async fn acquire(
        &self,
        keys: impl IntoIterator<Item = LockKey>,
        deadline: Instant,
    ) -> Result<LockSet, EconomyError> {
        let mut keys: Vec<LockKey> = keys.into_iter().collect();
        keys.sort();
        keys.dedup();

        let mut guards = Vec::with_capacity(keys.len());
        for key in &keys {
            let slot = self.slot(key);
            match tokio::time::timeout_at(deadline, slot.lock_owned()).await {
                Ok(guard) => guards.push(guard),
                Err(_) => {
                    tracing::warn!(resource = %key, "lock wait timed out");
                    return Err(EconomyError::Busy {
                        resource: key.to_string(),
                    });
                }
            }
        }

        Ok(LockSet {
            keys,
            _guards: guards,
        })
    }

    fn slot(&self, key: &LockKey) -> Arc<AsyncMutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        if slots.len() >= PRUNE_THRESHOLD {
            // A slot in use has a clone held by its waiter or guard
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);
        }
        slots.entry(key.clone()).or_default().clone()
    }

    /// Number of live slots
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "locks_tests.rs"]
mod tests;
