// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ID generation abstractions
//!
//! Account ids come from the owning user record and are never generated here.
//! Rewards and redemptions are minted by the economy itself.

use crate::redemption::RedemptionId;
use crate::reward::RewardId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Kinds of record that receive generated ids
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Reward,
    Redemption,
}

impl IdKind {
    pub fn prefix(self) -> &'static str {
        match self {
            IdKind::Reward => "rwd",
            IdKind::Redemption => "rdm",
        }
    }
}

/// Generates unique identifiers
pub trait IdGen: Clone + Send + Sync {
    fn next(&self, kind: IdKind) -> String;

    fn reward_id(&self) -> RewardId {
        RewardId(self.next(IdKind::Reward))
    }

    fn redemption_id(&self) -> RedemptionId {
        RedemptionId(self.next(IdKind::Redemption))
    }
}

/// UUID-based ID generator for production use
#[derive(Clone, Default)]
pub struct UuidIdGen;

impl IdGen for UuidIdGen {
    fn next(&self, kind: IdKind) -> String {
        format!("{}-{}", kind.prefix(), uuid::Uuid::new_v4().simple())
    }
}

/// Sequential ID generator for testing, one counter per kind
#[derive(Clone, Default)]
pub struct SequentialIdGen {
    rewards: Arc<AtomicU64>,
    redemptions: Arc<AtomicU64>,
}

impl SequentialIdGen {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGen for SequentialIdGen {
    fn next(&self, kind: IdKind) -> String {
        let counter = match kind {
            IdKind::Reward => &self.rewards,
            IdKind::Redemption => &self.redemptions,
        };
        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{}-{}", kind.prefix(), n)
    }
}
