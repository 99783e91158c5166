// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! kudos-core: domain model for the school points economy
//!
//! This crate provides:
//! - Accounts, rewards and redemptions as plain data
//! - The redemption state machine and the effects its transitions imply
//! - The error taxonomy shared by every layer
//! - Clock and id abstractions, and TOML configuration
//!
//! Nothing here performs I/O.

pub mod clock;
pub mod config;
pub mod id;

pub mod account;
pub mod effect;
pub mod error;
pub mod redemption;
pub mod reward;

pub use account::{Account, AccountId, EntryReason};
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{ConfigError, EconomyConfig, LedgerConfig, StoreConfig};
pub use effect::Effect;
pub use error::EconomyError;
pub use id::{IdGen, IdKind, SequentialIdGen, UuidIdGen};
pub use redemption::{Redemption, RedemptionId, RedemptionStatus};
pub use reward::{NewReward, Reward, RewardId, RewardPatch, Stock};
