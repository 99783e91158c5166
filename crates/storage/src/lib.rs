// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Durable storage for the kudos points economy

mod entry;
pub mod operation;
mod query;
mod state;
mod store;
mod wal;

pub use entry::WalEntry;
pub use operation::Operation;
pub use query::{RedemptionFilter, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use state::{
    datetime_to_micros, micros_to_datetime, ApplyError, EntryKind, LedgerEntry,
    MaterializedState, RecordKey,
};
pub use store::{Commit, Store, StoreError, WalStore};
pub use wal::{EntryPosition, Replay, Wal, WalCorruption, WalError};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod memory;
#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryStore;
