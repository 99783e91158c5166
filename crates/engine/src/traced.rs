// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced store wrapper for consistent observability

use kudos_storage::{Commit, MaterializedState, Store, StoreError};

/// Wrapper that adds tracing to any Store
#[derive(Clone)]
pub struct TracedStore<S> {
    inner: S,
}

impl<S> TracedStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: Store> Store for TracedStore<S> {
    fn read<R>(&self, f: impl FnOnce(&MaterializedState) -> R) -> R {
        self.inner.read(f)
    }

    fn commit(&self, commit: Commit) -> Result<u64, StoreError> {
        let span = tracing::info_span!(
            "store.commit",
            operations = commit.operations.len(),
            guarded = commit.expected.len()
        );
        let _guard = span.enter();

        let names: Vec<&'static str> = commit.operations.iter().map(|op| op.name()).collect();
        tracing::debug!(?names, "committing");

        let start = std::time::Instant::now();
        let result = self.inner.commit(commit);
        let elapsed = start.elapsed();

        match &result {
            Ok(sequence) => tracing::info!(
                sequence,
                elapsed_ms = elapsed.as_millis() as u64,
                "committed"
            ),
            // Conflicts are retried by the caller
            Err(e @ StoreError::Conflict { .. }) => tracing::debug!(
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "commit conflicted"
            ),
            Err(e) => tracing::error!(
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "commit failed"
            ),
        }

        result
    }
}
