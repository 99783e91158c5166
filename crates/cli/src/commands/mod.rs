// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod account;
pub mod redemption;
pub mod reward;

use crate::output::{self, OutputFormat};
use anyhow::Context;
use kudos_core::{EconomyConfig, SystemClock, UuidIdGen};
use kudos_engine::{Coordinator, TracedStore};
use kudos_storage::WalStore;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Coordinator over the data directory's ledger
pub type Economy = Coordinator<TracedStore<WalStore>, SystemClock, UuidIdGen>;

/// Config file read from the data directory
pub const CONFIG_FILE: &str = "kudos.toml";

pub fn open_economy(data_dir: &Path) -> anyhow::Result<Economy> {
    let config_path = data_dir.join(CONFIG_FILE);
    let config = EconomyConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    let store = WalStore::open(data_dir, &config.store.machine_id())
        .with_context(|| format!("opening ledger in {}", data_dir.display()))?;
    tracing::debug!(data_dir = %data_dir.display(), "ledger opened");

    Ok(Coordinator::new(
        TracedStore::new(store),
        SystemClock,
        UuidIdGen,
        config.ledger,
    ))
}

#[derive(Serialize)]
struct RepairReport {
    data_dir: String,
    bytes_removed: u64,
}

impl fmt::Display for RepairReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bytes_removed == 0 {
            write!(f, "Ledger in {} is intact", self.data_dir)
        } else {
            write!(
                f,
                "Removed {} bytes of corrupt ledger data from {}",
                self.bytes_removed, self.data_dir
            )
        }
    }
}

pub fn repair(data_dir: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let bytes_removed = WalStore::repair(data_dir)
        .with_context(|| format!("repairing ledger in {}", data_dir.display()))?;
    output::print(
        &RepairReport {
            data_dir: data_dir.display().to_string(),
            bytes_removed,
        },
        format,
    );
    Ok(())
}
