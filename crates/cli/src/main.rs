// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! kudos - school points economy CLI

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{account, redemption, reward};
use output::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "kudos",
    version,
    about = "Kudos - school points, rewards and redemptions"
)]
struct Cli {
    /// Data directory holding the ledger (default: $KUDOS_DATA_DIR or ./.kudos)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Point accounts
    Account {
        #[command(subcommand)]
        command: account::AccountCommand,
    },
    /// Reward catalog
    Reward {
        #[command(subcommand)]
        command: reward::RewardCommand,
    },
    /// Claim a reward for an account
    Redeem(redemption::RedeemArgs),
    /// Redemption review
    Redemption {
        #[command(subcommand)]
        command: redemption::RedemptionCommand,
    },
    /// Truncate the ledger log at its first corrupt entry
    Repair,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let data_dir = cli.data_dir.unwrap_or_else(default_data_dir);

    match cli.command {
        Commands::Repair => commands::repair(&data_dir, cli.format),
        Commands::Account { command } => {
            let economy = commands::open_economy(&data_dir)?;
            account::handle(&economy, command, cli.format).await
        }
        Commands::Reward { command } => {
            let economy = commands::open_economy(&data_dir)?;
            reward::handle(&economy, command, cli.format).await
        }
        Commands::Redeem(args) => {
            let economy = commands::open_economy(&data_dir)?;
            redemption::redeem(&economy, args, cli.format).await
        }
        Commands::Redemption { command } => {
            let economy = commands::open_economy(&data_dir)?;
            redemption::handle(&economy, command, cli.format).await
        }
    }
}

fn default_data_dir() -> PathBuf {
    std::env::var_os("KUDOS_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".kudos"))
}

/// Log to stderr so stdout stays parseable; `KUDOS_LOG` sets the filter
fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_env("KUDOS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
