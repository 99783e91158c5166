// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable store interface and its WAL-backed implementation
//!
//! A store exposes committed state for reading and accepts commits: a batch
//! of operations plus the versions of every record the batch was computed
//! from. A commit either applies in full or not at all.

use crate::operation::Operation;
use crate::state::{ApplyError, MaterializedState, RecordKey};
use crate::wal::{EntryPosition, Replay, Wal, WalError};
use kudos_core::EconomyError;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Errors from store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("WAL error: {0}")]
    Wal(#[from] WalError),
    #[error("WAL corrupted at line {line}: {reason} (run repair to truncate)")]
    Corrupted { line: u64, reason: String },
    #[error("version conflict on {key}: expected {expected}, found {found}")]
    Conflict {
        key: RecordKey,
        expected: u64,
        found: u64,
    },
    #[error("batch rejected: {0}")]
    Apply(#[from] ApplyError),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for EconomyError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict { key, .. } => EconomyError::Busy {
                resource: key.to_string(),
            },
            StoreError::Apply(ApplyError::Invariant(inner)) => inner,
            other => EconomyError::StorageUnavailable(other.to_string()),
        }
    }
}

/// One atomic unit of writes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Commit {
    /// Versions the unit observed; 0 means the record must not exist
    pub expected: Vec<(RecordKey, u64)>,
    pub operations: Vec<Operation>,
}

impl Commit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `key` to still be at `version` when the commit lands
    pub fn expect(&mut self, key: RecordKey, version: u64) {
        if !self.expected.iter().any(|(k, _)| k == &key) {
            self.expected.push((key, version));
        }
    }

    pub fn push(&mut self, op: Operation) {
        self.operations.push(op);
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Durable storage with atomic multi-write commits
pub trait Store: Send + Sync {
    /// Run `f` against committed state
    fn read<R>(&self, f: impl FnOnce(&MaterializedState) -> R) -> R;

    /// Atomically apply a commit, returning its sequence number
    fn commit(&self, commit: Commit) -> Result<u64, StoreError>;
}

/// Check every expected version against committed state
pub(crate) fn verify_versions(
    state: &MaterializedState,
    expected: &[(RecordKey, u64)],
) -> Result<(), StoreError> {
    for (key, version) in expected {
        let found = state.version(key);
        if found != *version {
            return Err(StoreError::Conflict {
                key: key.clone(),
                expected: *version,
                found,
            });
        }
    }
    Ok(())
}

/// Rebuild state from replayed entries, each applied all-or-nothing
///
/// Stops at the first entry that does not apply, returning its position.
fn materialize(replay: &Replay) -> (MaterializedState, Option<(EntryPosition, String)>) {
    let mut state = MaterializedState::new();
    for (entry, position) in replay.entries.iter().zip(&replay.positions) {
        let applied = state
            .check(&entry.operations)
            .and_then(|()| state.apply_all(&entry.operations));
        if let Err(e) = applied {
            let reason = format!("entry {} does not apply: {}", entry.sequence, e);
            return (state, Some((*position, reason)));
        }
    }
    (state, None)
}

/// WAL-based store: `wal.jsonl` in a data directory
pub struct WalStore {
    base_dir: PathBuf,
    inner: Mutex<WalStoreInner>,
}

struct WalStoreInner {
    wal: Wal,
    state: MaterializedState,
}

impl WalStore {
    /// Open or create a store at the given directory, replaying the WAL
    ///
    /// A torn final line is cut off. Any other corruption fails the open
    /// so that no entry after it is silently dropped.
    pub fn open(base_dir: &Path, machine_id: &str) -> Result<Self, StoreError> {
        std::fs::create_dir_all(base_dir).map_err(WalError::from)?;
        let wal_path = Self::wal_path(base_dir);

        let replay = Wal::replay(&wal_path)?;
        if let Some(corruption) = &replay.corruption {
            if corruption.torn {
                tracing::warn!(
                    line = corruption.line,
                    reason = %corruption.reason,
                    "discarding torn WAL tail"
                );
                Wal::truncate(&wal_path, replay.valid_len)?;
            } else {
                return Err(StoreError::Corrupted {
                    line: corruption.line,
                    reason: corruption.reason.clone(),
                });
            }
        }

        let (state, unreplayable) = materialize(&replay);
        if let Some((position, reason)) = unreplayable {
            return Err(StoreError::Corrupted {
                line: position.line,
                reason,
            });
        }
        tracing::debug!(
            entries = replay.entries.len(),
            accounts = state.accounts.len(),
            rewards = state.rewards.len(),
            "WAL replayed"
        );

        let wal = Wal::open(&wal_path, machine_id, replay.next_sequence())?;
        Ok(Self {
            base_dir: base_dir.to_path_buf(),
            inner: Mutex::new(WalStoreInner { wal, state }),
        })
    }

    /// Truncate a store's WAL at its first corrupt entry
    ///
    /// An entry that parses but no longer applies to the state before it
    /// counts as corrupt too. For explicit crash recovery only. Returns the
    /// number of bytes removed.
    pub fn repair(base_dir: &Path) -> Result<u64, StoreError> {
        let wal_path = Self::wal_path(base_dir);
        let mut removed = Wal::repair(&wal_path)?;

        let replay = Wal::replay(&wal_path)?;
        if let (_, Some((position, reason))) = materialize(&replay) {
            tracing::warn!(line = position.line, %reason, "cutting WAL at unreplayable entry");
            let len = std::fs::metadata(&wal_path).map_err(WalError::from)?.len();
            Wal::truncate(&wal_path, position.offset)?;
            removed += len.saturating_sub(position.offset);
        }
        Ok(removed)
    }

    fn wal_path(base_dir: &Path) -> PathBuf {
        base_dir.join("wal.jsonl")
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Sequence number the next commit will receive
    pub fn sequence(&self) -> u64 {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.wal.sequence()
    }
}

impl Store for WalStore {
    fn read<R>(&self, f: impl FnOnce(&MaterializedState) -> R) -> R {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f(&inner.state)
    }

    fn commit(&self, commit: Commit) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if commit.is_empty() {
            return Ok(inner.wal.sequence());
        }

        verify_versions(&inner.state, &commit.expected)?;
        inner.state.check(&commit.operations)?;

        let sequence = inner.wal.append(commit.operations.clone())?;
        if let Err(e) = inner.state.apply_all(&commit.operations) {
            // check() ran the same operations against the same records
            tracing::error!(sequence, error = %e, "checked batch failed to apply");
        }
        Ok(sequence)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
