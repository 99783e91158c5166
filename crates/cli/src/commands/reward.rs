// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reward catalog commands

use super::Economy;
use crate::output::{self, OutputFormat};
use clap::Subcommand;
use kudos_core::{EconomyError, NewReward, Reward, RewardId, RewardPatch, Stock};
use serde::Serialize;
use std::fmt;

#[derive(Subcommand)]
pub enum RewardCommand {
    /// Add a reward to the catalog
    Create {
        name: String,
        /// Points per unit
        #[arg(long)]
        cost: u64,
        /// Units available, or "unlimited"
        #[arg(long, default_value = "unlimited")]
        stock: Stock,
        #[arg(long, default_value = "")]
        description: String,
        /// Create the reward switched off
        #[arg(long)]
        inactive: bool,
    },
    /// Show a reward
    Show { id: String },
    /// List rewards
    List {
        /// Only rewards that can currently be claimed
        #[arg(long)]
        active: bool,
    },
    /// Edit a reward; redemptions already made keep their price
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        cost: Option<u64>,
        #[arg(long)]
        stock: Option<Stock>,
        /// Switch the reward on (true) or off (false)
        #[arg(long)]
        active: Option<bool>,
    },
    /// Remove a reward with no pending redemptions
    Delete { id: String },
}

#[derive(Serialize)]
#[serde(transparent)]
struct RewardView(Reward);

impl fmt::Display for RewardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reward = &self.0;
        write!(
            f,
            "{:<14} {:<24} cost={:<5} stock={:<9} {}",
            reward.id,
            reward.name,
            reward.cost,
            reward.stock,
            if reward.active { "active" } else { "inactive" }
        )
    }
}

pub async fn handle(
    economy: &Economy,
    command: RewardCommand,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match command {
        RewardCommand::Create {
            name,
            cost,
            stock,
            description,
            inactive,
        } => {
            let mut new = NewReward::new(name, cost, stock).with_description(description);
            if inactive {
                new = new.inactive();
            }
            let reward = economy.create_reward(new).await?;
            output::print(&RewardView(reward), format);
        }
        RewardCommand::Show { id } => {
            let id = RewardId::from(id);
            let reward = economy
                .reward(&id)
                .ok_or(EconomyError::RewardNotFound(id))?;
            output::print(&RewardView(reward), format);
        }
        RewardCommand::List { active } => {
            let rewards: Vec<RewardView> = economy
                .list_rewards(active)
                .into_iter()
                .map(RewardView)
                .collect();
            output::print_list(&rewards, "No rewards", format);
        }
        RewardCommand::Update {
            id,
            name,
            description,
            cost,
            stock,
            active,
        } => {
            let patch = RewardPatch {
                name,
                description,
                cost,
                stock,
                active,
            };
            let reward = economy.update_reward(&id.into(), patch).await?;
            output::print(&RewardView(reward), format);
        }
        RewardCommand::Delete { id } => {
            let reward = economy.delete_reward(&id.into()).await?;
            if format == OutputFormat::Text {
                println!("Deleted {}", reward.id);
            } else {
                output::print(&RewardView(reward), format);
            }
        }
    }
    Ok(())
}
