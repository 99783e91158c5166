// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only queries over committed state

use crate::state::MaterializedState;
use kudos_core::{AccountId, Redemption, RedemptionStatus, Reward, RewardId};
use serde::{Deserialize, Serialize};

/// Page size used when a filter names none
pub const DEFAULT_PAGE_SIZE: usize = 50;
/// Upper bound on a single page
pub const MAX_PAGE_SIZE: usize = 200;

/// Selection and paging for redemption listings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward: Option<RewardId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RedemptionStatus>,
    #[serde(default)]
    pub offset: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl RedemptionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account(mut self, account: impl Into<AccountId>) -> Self {
        self.account = Some(account.into());
        self
    }

    pub fn reward(mut self, reward: impl Into<RewardId>) -> Self {
        self.reward = Some(reward.into());
        self
    }

    pub fn status(mut self, status: RedemptionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = Some(limit);
        self
    }

    /// Effective page size, clamped to `1..=MAX_PAGE_SIZE`
    pub fn page_size(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    pub fn matches(&self, redemption: &Redemption) -> bool {
        self.account.as_ref().is_none_or(|a| a == &redemption.account)
            && self.reward.as_ref().is_none_or(|r| r == &redemption.reward)
            && self.status.is_none_or(|s| s == redemption.status)
    }
}

impl MaterializedState {
    /// Redemptions matching `filter`, newest first
    pub fn query_redemptions(&self, filter: &RedemptionFilter) -> Vec<Redemption> {
        let mut matched: Vec<&Redemption> = self
            .redemptions
            .values()
            .filter(|r| filter.matches(r))
            .collect();
        matched.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        matched
            .into_iter()
            .skip(filter.offset)
            .take(filter.page_size())
            .cloned()
            .collect()
    }

    /// Catalog entries ordered by name, then id
    pub fn list_rewards(&self, active_only: bool) -> Vec<Reward> {
        let mut rewards: Vec<&Reward> = self
            .rewards
            .values()
            .filter(|r| !active_only || r.active)
            .collect();
        rewards.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        rewards.into_iter().cloned().collect()
    }
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
