// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-ahead log for durable storage
//!
//! ```text
//! Commit → WalEntry → Wal::append → disk (wal.jsonl, fsync)
//!                                        ↓
//!                             Wal::replay → MaterializedState
//! ```
//!
//! A line that fails to parse or verify ends the valid prefix of the log.
//! An unterminated final line is a torn write from a crash mid-append and
//! is safe to cut off; anything else needs an explicit repair.

use crate::entry::WalEntry;
use crate::operation::Operation;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur in WAL operations
#[derive(Debug, Error)]
pub enum WalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("WAL is unusable after a failed append could not be rolled back")]
    Poisoned,
}

/// Where and why replay stopped early
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalCorruption {
    /// 1-based line number of the first bad line
    pub line: u64,
    pub reason: String,
    /// The bad line is an unterminated tail left by an interrupted append
    pub torn: bool,
}

/// Where a replayed entry sits in the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryPosition {
    /// 1-based line number
    pub line: u64,
    /// Byte offset of the start of the line
    pub offset: u64,
}

/// Result of reading a WAL file
#[derive(Debug, Default)]
pub struct Replay {
    pub entries: Vec<WalEntry>,
    /// Position of each entry, index for index
    pub positions: Vec<EntryPosition>,
    /// Byte length of the valid prefix
    pub valid_len: u64,
    pub corruption: Option<WalCorruption>,
}

impl Replay {
    /// Sequence number the next append should use
    pub fn next_sequence(&self) -> u64 {
        self.entries.last().map(|e| e.sequence + 1).unwrap_or(0)
    }
}

/// Append handle on a WAL file
pub struct Wal {
    path: PathBuf,
    file: File,
    next_sequence: u64,
    machine_id: String,
    poisoned: bool,
}

impl Wal {
    /// Open or create a WAL for appending, continuing at `next_sequence`
    pub fn open(path: &Path, machine_id: &str, next_sequence: u64) -> Result<Self, WalError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
            next_sequence,
            machine_id: machine_id.to_string(),
            poisoned: false,
        })
    }

    /// Append one committed unit
    ///
    /// Returns the assigned sequence number. The entry is fsync'd before
    /// this returns. On error nothing of the entry is left in the file and
    /// the sequence number is not consumed.
    pub fn append(&mut self, operations: Vec<Operation>) -> Result<u64, WalError> {
        let sequence = self.next_sequence;
        let entry = WalEntry::new(sequence, &self.machine_id, operations);
        let mut line = entry.to_line()?;
        line.push('\n');

        self.write_line(line.as_bytes(), |file, bytes| {
            file.write_all(bytes)?;
            file.sync_all()
        })?;

        self.next_sequence += 1;
        Ok(sequence)
    }

    /// Write `bytes` with `write`, cutting the file back if it fails
    ///
    /// A failed rollback poisons the WAL: its length is then unknown, so no
    /// further append is accepted.
    fn write_line(
        &mut self,
        bytes: &[u8],
        write: impl FnOnce(&mut File, &[u8]) -> io::Result<()>,
    ) -> Result<(), WalError> {
        if self.poisoned {
            return Err(WalError::Poisoned);
        }
        let len = self.file.metadata()?.len();
        let Err(e) = write(&mut self.file, bytes) else {
            return Ok(());
        };

        match rollback(&self.file, len) {
            Ok(()) => tracing::warn!(error = %e, len, "WAL append failed, rolled back"),
            Err(rollback_err) => {
                self.poisoned = true;
                tracing::error!(
                    error = %e,
                    rollback_error = %rollback_err,
                    "WAL append failed and could not be rolled back"
                );
            }
        }
        Err(e.into())
    }

    /// Sequence number the next append will use
    pub fn sequence(&self) -> u64 {
        self.next_sequence
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn machine_id(&self) -> &str {
        &self.machine_id
    }

    /// Read every valid entry, stopping at the first bad line
    pub fn replay(path: &Path) -> Result<Replay, WalError> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Replay::default()),
            Err(e) => return Err(e.into()),
        };

        let mut reader = BufReader::new(file);
        let mut replay = Replay::default();
        let mut buf = Vec::new();
        let mut line_number = 0u64;

        loop {
            buf.clear();
            let read = reader.read_until(b'\n', &mut buf)?;
            if read == 0 {
                break;
            }
            line_number += 1;
            let terminated = buf.last() == Some(&b'\n');
            let text = String::from_utf8_lossy(&buf);
            let line = text.trim();

            if line.is_empty() {
                replay.valid_len += read as u64;
                continue;
            }

            match WalEntry::from_line(line) {
                Ok(entry) if entry.verify() => {
                    replay.entries.push(entry);
                    replay.positions.push(EntryPosition {
                        line: line_number,
                        offset: replay.valid_len,
                    });
                    replay.valid_len += read as u64;
                }
                Ok(_) => {
                    replay.corruption = Some(WalCorruption {
                        line: line_number,
                        reason: "checksum mismatch".to_string(),
                        torn: !terminated,
                    });
                    break;
                }
                Err(e) => {
                    replay.corruption = Some(WalCorruption {
                        line: line_number,
                        reason: e.to_string(),
                        torn: !terminated,
                    });
                    break;
                }
            }
        }

        Ok(replay)
    }

    /// Cut the file back to its valid prefix
    ///
    /// Returns the number of bytes removed.
    pub fn repair(path: &Path) -> Result<u64, WalError> {
        let replay = Self::replay(path)?;
        if replay.corruption.is_none() {
            return Ok(0);
        }
        let old_len = std::fs::metadata(path)?.len();
        Self::truncate(path, replay.valid_len)?;
        Ok(old_len.saturating_sub(replay.valid_len))
    }

    pub(crate) fn truncate(path: &Path, len: u64) -> Result<(), WalError> {
        let file = OpenOptions::new().write(true).open(path)?;
        file.set_len(len)?;
        file.sync_all()?;
        tracing::info!(path = %path.display(), len, "WAL truncated at last valid entry");
        Ok(())
    }
}

/// Cut `file` back to `len` bytes and make the cut durable
fn rollback(file: &File, len: u64) -> io::Result<()> {
    file.set_len(len)?;
    file.sync_all()
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
