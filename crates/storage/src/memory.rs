// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory store for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use crate::operation::Operation;
use crate::state::MaterializedState;
use crate::store::{verify_versions, Commit, Store, StoreError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct MemoryInner {
    state: MaterializedState,
    committed: Vec<Vec<Operation>>,
}

/// Store that keeps everything in memory and can simulate an outage
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following commit fail with `StoreError::Unavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Operation batches committed so far, oldest first
    pub fn committed(&self) -> Vec<Vec<Operation>> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .committed
            .clone()
    }
}

impl Store for MemoryStore {
    fn read<R>(&self, f: impl FnOnce(&MaterializedState) -> R) -> R {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f(&inner.state)
    }

    fn commit(&self, commit: Commit) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("simulated outage".to_string()));
        }
        if commit.is_empty() {
            return Ok(inner.committed.len() as u64);
        }

        verify_versions(&inner.state, &commit.expected)?;
        inner.state.check(&commit.operations)?;
        inner.state.apply_all(&commit.operations)?;

        let sequence = inner.committed.len() as u64;
        inner.committed.push(commit.operations);
        Ok(sequence)
    }
}
