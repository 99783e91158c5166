// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for the points economy
//!
//! Every variant is recoverable by the caller and is only ever returned
//! with shared state left exactly as it was before the request.

use crate::account::AccountId;
use crate::redemption::{RedemptionId, RedemptionStatus};
use crate::reward::RewardId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EconomyError {
    #[error("insufficient funds in account {account}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        account: AccountId,
        balance: u64,
        requested: u64,
    },
    #[error("insufficient stock for reward {reward}: available {available}, requested {requested}")]
    InsufficientStock {
        reward: RewardId,
        available: u64,
        requested: u64,
    },
    #[error("reward not found: {0}")]
    RewardNotFound(RewardId),
    #[error("reward is not active: {0}")]
    RewardInactive(RewardId),
    #[error("reward {reward} still has {pending} pending redemption(s)")]
    RewardInUse { reward: RewardId, pending: usize },
    #[error("reward already exists: {0}")]
    RewardExists(RewardId),
    #[error("redemption not found: {0}")]
    RedemptionNotFound(RedemptionId),
    #[error("invalid transition for redemption {id}: {from} -> {to}")]
    InvalidTransition {
        id: RedemptionId,
        from: RedemptionStatus,
        to: RedemptionStatus,
    },
    #[error("account not found: {0}")]
    AccountNotFound(AccountId),
    #[error("account already exists: {0}")]
    AccountExists(AccountId),
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("resource busy: {resource}")]
    Busy { resource: String },
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl EconomyError {
    /// Short machine-readable kind, stable across message wording changes
    pub fn kind(&self) -> &'static str {
        match self {
            EconomyError::InsufficientFunds { .. } => "insufficient_funds",
            EconomyError::InsufficientStock { .. } => "insufficient_stock",
            EconomyError::RewardNotFound(_) => "reward_not_found",
            EconomyError::RewardInactive(_) => "reward_inactive",
            EconomyError::RewardInUse { .. } => "reward_in_use",
            EconomyError::RewardExists(_) => "reward_exists",
            EconomyError::RedemptionNotFound(_) => "redemption_not_found",
            EconomyError::InvalidTransition { .. } => "invalid_transition",
            EconomyError::AccountNotFound(_) => "account_not_found",
            EconomyError::AccountExists(_) => "account_exists",
            EconomyError::InvalidAmount(_) => "invalid_amount",
            EconomyError::Busy { .. } => "busy",
            EconomyError::StorageUnavailable(_) => "storage_unavailable",
        }
    }
}
