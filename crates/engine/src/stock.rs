// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reward stock manager

use crate::unit::Unit;
use kudos_core::{EconomyError, Reward, RewardId};
use kudos_storage::operation::StockOp;
use kudos_storage::{Operation, Store};

impl<S: Store> Unit<'_, S> {
    /// Reward as the unit currently sees it, or `RewardNotFound`
    pub fn get_reward(&mut self, id: &RewardId) -> Result<Reward, EconomyError> {
        self.reward(id)
            .ok_or_else(|| EconomyError::RewardNotFound(id.clone()))
    }

    /// Take `quantity` units out of a reward's stock
    ///
    /// Unlimited stock is left as is. Returns the reward after reservation.
    pub fn reserve_stock(&mut self, id: &RewardId, quantity: u32) -> Result<Reward, EconomyError> {
        let reserved = self.get_reward(id)?.reserved(quantity)?;
        self.stage(Operation::StockReserve(StockOp {
            reward: id.0.clone(),
            quantity,
        }))?;
        Ok(reserved)
    }

    /// Put `quantity` units back into a reward's stock
    ///
    /// Compensation must not be refusable, so a reward that no longer
    /// exists is skipped with a warning instead of failing the unit.
    pub fn release_stock(&mut self, id: &RewardId, quantity: u32) -> Result<(), EconomyError> {
        if self.reward(id).is_none() {
            tracing::warn!(reward = %id, quantity, "release for missing reward skipped");
            return Ok(());
        }
        self.stage(Operation::StockRelease(StockOp {
            reward: id.0.clone(),
            quantity,
        }))
    }
}

#[cfg(test)]
#[path = "stock_tests.rs"]
mod tests;
