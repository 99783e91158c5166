// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Redemption commands

use super::Economy;
use crate::output::{self, OutputFormat};
use clap::{Args, Subcommand};
use kudos_core::{AccountId, EconomyError, Redemption, RedemptionId, RedemptionStatus, RewardId};
use kudos_storage::RedemptionFilter;
use serde::Serialize;
use std::fmt;

#[derive(Args)]
pub struct RedeemArgs {
    /// Account paying for the reward
    pub account: String,
    /// Reward to claim
    pub reward: String,
    /// Units to claim
    #[arg(short, long, default_value_t = 1)]
    pub quantity: u32,
}

#[derive(Subcommand)]
pub enum RedemptionCommand {
    /// Show a redemption
    Show { id: String },
    /// List redemptions, newest first
    List {
        #[arg(long)]
        account: Option<String>,
        #[arg(long)]
        reward: Option<String>,
        /// pending, approved, rejected or delivered
        #[arg(long)]
        status: Option<RedemptionStatus>,
        #[arg(long, default_value_t = 0)]
        offset: usize,
        /// Page size (default 50, at most 200)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Approve a pending redemption
    Approve { id: String },
    /// Reject a pending redemption, refunding its points and stock
    Reject { id: String },
    /// Mark an approved redemption as handed out
    Deliver { id: String },
}

#[derive(Serialize)]
#[serde(transparent)]
struct RedemptionView(Redemption);

impl fmt::Display for RedemptionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.0;
        write!(
            f,
            "{:<14} {:<9} account={} reward={} qty={} points={} created={}",
            r.id,
            r.status,
            r.account,
            r.reward,
            r.quantity,
            r.points_spent,
            r.created_at.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

pub async fn redeem(economy: &Economy, args: RedeemArgs, format: OutputFormat) -> anyhow::Result<()> {
    let redemption = economy
        .create_redemption(
            &AccountId::from(args.account),
            &RewardId::from(args.reward),
            args.quantity,
        )
        .await?;
    output::print(&RedemptionView(redemption), format);
    Ok(())
}

pub async fn handle(
    economy: &Economy,
    command: RedemptionCommand,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let redemption = match command {
        RedemptionCommand::Show { id } => {
            let id = RedemptionId::from(id);
            economy
                .redemption(&id)
                .ok_or(EconomyError::RedemptionNotFound(id))?
        }
        RedemptionCommand::List {
            account,
            reward,
            status,
            offset,
            limit,
        } => {
            let filter = RedemptionFilter {
                account: account.map(AccountId::from),
                reward: reward.map(RewardId::from),
                status,
                offset,
                limit,
            };
            let redemptions: Vec<RedemptionView> = economy
                .list_redemptions(&filter)
                .into_iter()
                .map(RedemptionView)
                .collect();
            output::print_list(&redemptions, "No redemptions", format);
            return Ok(());
        }
        RedemptionCommand::Approve { id } => economy.approve(&id.into()).await?,
        RedemptionCommand::Reject { id } => economy.reject(&id.into()).await?,
        RedemptionCommand::Deliver { id } => economy.deliver(&id.into()).await?,
    };
    output::print(&RedemptionView(redemption), format);
    Ok(())
}
