// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Account commands

use super::Economy;
use crate::output::{self, OutputFormat};
use clap::Subcommand;
use kudos_core::{Account, AccountId, EconomyError};
use kudos_storage::{EntryKind, LedgerEntry};
use serde::Serialize;
use std::fmt;

#[derive(Subcommand)]
pub enum AccountCommand {
    /// Open an account
    Open {
        /// Account ID (the owning user's ID)
        account: String,
        /// Opening balance
        #[arg(long, default_value_t = 0)]
        balance: u64,
    },
    /// Show an account's balance
    Show { account: String },
    /// Award points to an account
    Award {
        account: String,
        amount: u64,
        /// Why the points were awarded
        #[arg(long, default_value = "")]
        reason: String,
    },
    /// Take points away from an account
    Deduct {
        account: String,
        amount: u64,
        /// Why the points were deducted
        #[arg(long, default_value = "")]
        reason: String,
    },
    /// List an account's balance movements, oldest first
    History { account: String },
}

#[derive(Serialize)]
#[serde(transparent)]
struct AccountView(Account);

impl fmt::Display for AccountView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<20} balance={}", self.0.id, self.0.balance)
    }
}

#[derive(Serialize)]
#[serde(transparent)]
struct EntryView(LedgerEntry);

impl fmt::Display for EntryView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entry = &self.0;
        let sign = match entry.kind {
            EntryKind::Credit => '+',
            EntryKind::Debit => '-',
        };
        write!(
            f,
            "{} {}{:<6} balance={:<6} {}",
            entry.at.format("%Y-%m-%d %H:%M:%S"),
            sign,
            entry.amount,
            entry.balance_after,
            entry.reason
        )?;
        if let Some(redemption) = &entry.redemption {
            write!(f, " ({})", redemption)?;
        }
        Ok(())
    }
}

pub async fn handle(
    economy: &Economy,
    command: AccountCommand,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match command {
        AccountCommand::Open { account, balance } => {
            let account = economy.open_account(account, balance).await?;
            output::print(&AccountView(account), format);
        }
        AccountCommand::Show { account } => {
            output::print(&AccountView(load(economy, &account.into())?), format);
        }
        AccountCommand::Award {
            account,
            amount,
            reason,
        } => {
            let id = AccountId::from(account);
            economy.award_points(&id, amount, reason).await?;
            output::print(&AccountView(load(economy, &id)?), format);
        }
        AccountCommand::Deduct {
            account,
            amount,
            reason,
        } => {
            let id = AccountId::from(account);
            economy.deduct_points(&id, amount, reason).await?;
            output::print(&AccountView(load(economy, &id)?), format);
        }
        AccountCommand::History { account } => {
            let entries: Vec<EntryView> = economy
                .ledger_history(&account.into())?
                .into_iter()
                .map(EntryView)
                .collect();
            output::print_list(&entries, "No ledger entries", format);
        }
    }
    Ok(())
}

fn load(economy: &Economy, id: &AccountId) -> Result<Account, EconomyError> {
    economy
        .account(id)
        .ok_or_else(|| EconomyError::AccountNotFound(id.clone()))
}
