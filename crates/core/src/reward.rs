// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reward catalog entries and their stock counters

use crate::error::EconomyError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a reward
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RewardId(pub String);

impl std::fmt::Display for RewardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RewardId {
    fn from(s: String) -> Self {
        RewardId(s)
    }
}

impl From<&str> for RewardId {
    fn from(s: &str) -> Self {
        RewardId(s.to_string())
    }
}

/// Units of a reward left to hand out
///
/// Serialized as a plain integer, or the string `"unlimited"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StockRepr", into = "StockRepr")]
pub enum Stock {
    Finite(u64),
    Unlimited,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum StockRepr {
    Count(u64),
    Sentinel(String),
}

impl TryFrom<StockRepr> for Stock {
    type Error = String;

    fn try_from(repr: StockRepr) -> Result<Self, Self::Error> {
        match repr {
            StockRepr::Count(n) => Ok(Stock::Finite(n)),
            StockRepr::Sentinel(s) => s.parse(),
        }
    }
}

impl From<Stock> for StockRepr {
    fn from(stock: Stock) -> Self {
        match stock {
            Stock::Finite(n) => StockRepr::Count(n),
            Stock::Unlimited => StockRepr::Sentinel("unlimited".to_string()),
        }
    }
}

impl std::str::FromStr for Stock {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "unlimited" => Ok(Stock::Unlimited),
            other => other
                .parse::<u64>()
                .map(Stock::Finite)
                .map_err(|_| format!("invalid stock '{}': expected a count or 'unlimited'", s)),
        }
    }
}

impl std::fmt::Display for Stock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stock::Finite(n) => write!(f, "{}", n),
            Stock::Unlimited => write!(f, "unlimited"),
        }
    }
}

impl Stock {
    pub fn is_unlimited(&self) -> bool {
        matches!(self, Stock::Unlimited)
    }
}

/// A redeemable catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub id: RewardId,
    pub name: String,
    pub description: String,
    /// Price of one unit in points, always positive
    pub cost: u64,
    pub stock: Stock,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u64,
}

impl Reward {
    /// Total price of `quantity` units at the current cost
    pub fn price(&self, quantity: u32) -> Result<u64, EconomyError> {
        if quantity == 0 {
            return Err(EconomyError::InvalidAmount(
                "quantity must be at least 1".to_string(),
            ));
        }
        self.cost.checked_mul(u64::from(quantity)).ok_or_else(|| {
            EconomyError::InvalidAmount(format!(
                "{} x {} points overflows",
                quantity, self.cost
            ))
        })
    }

    /// Reward after taking `quantity` units out of stock
    pub fn reserved(&self, quantity: u32) -> Result<Reward, EconomyError> {
        if !self.active {
            return Err(EconomyError::RewardInactive(self.id.clone()));
        }
        if quantity == 0 {
            return Err(EconomyError::InvalidAmount(
                "quantity must be at least 1".to_string(),
            ));
        }
        let stock = match self.stock {
            Stock::Unlimited => Stock::Unlimited,
            Stock::Finite(available) => available
                .checked_sub(u64::from(quantity))
                .map(Stock::Finite)
                .ok_or_else(|| EconomyError::InsufficientStock {
                    reward: self.id.clone(),
                    available,
                    requested: u64::from(quantity),
                })?,
        };
        Ok(Reward {
            stock,
            ..self.clone()
        })
    }

    /// Reward after returning `quantity` units to stock
    ///
    /// Never refused: inactive rewards still take their stock back, and the
    /// counter saturates instead of overflowing.
    pub fn released(&self, quantity: u32) -> Reward {
        let stock = match self.stock {
            Stock::Unlimited => Stock::Unlimited,
            Stock::Finite(available) => Stock::Finite(available.saturating_add(u64::from(quantity))),
        };
        Reward {
            stock,
            ..self.clone()
        }
    }
}

/// Fields for a new catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReward {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub cost: u64,
    pub stock: Stock,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl NewReward {
    pub fn new(name: impl Into<String>, cost: u64, stock: Stock) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            cost,
            stock,
            active: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn validate(&self) -> Result<(), EconomyError> {
        if self.cost == 0 {
            return Err(EconomyError::InvalidAmount(
                "reward cost must be positive".to_string(),
            ));
        }
        if self.name.trim().is_empty() {
            return Err(EconomyError::InvalidAmount(
                "reward name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Direct edits to a catalog entry; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<Stock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl RewardPatch {
    pub fn is_empty(&self) -> bool {
        self == &RewardPatch::default()
    }

    pub fn validate(&self) -> Result<(), EconomyError> {
        if self.cost == Some(0) {
            return Err(EconomyError::InvalidAmount(
                "reward cost must be positive".to_string(),
            ));
        }
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            return Err(EconomyError::InvalidAmount(
                "reward name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply the edit, leaving the version for the store to bump
    pub fn applied_to(&self, reward: &Reward, at: DateTime<Utc>) -> Reward {
        Reward {
            name: self.name.clone().unwrap_or_else(|| reward.name.clone()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| reward.description.clone()),
            cost: self.cost.unwrap_or(reward.cost),
            stock: self.stock.unwrap_or(reward.stock),
            active: self.active.unwrap_or(reward.active),
            updated_at: at,
            ..reward.clone()
        }
    }
}

#[cfg(test)]
#[path = "reward_tests.rs"]
mod tests;
