// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Kudos transaction engine: points ledger, stock manager and the
//! coordinator that composes them into atomic units

mod coordinator;
mod ledger;
mod locks;
mod stock;
mod traced;
mod unit;

pub use coordinator::Coordinator;
pub use locks::{LockKey, LockSet, LockTable};
pub use traced::TracedStore;
pub use unit::Unit;
