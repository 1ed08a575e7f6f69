//! Balances may go negative when upstream events arrive out of order or the
//! contracts misbehave. The indexer records them as-is and says so.

use staking_core::{Entity, GlobalStats, User};
use tracing::warn;

pub(crate) fn warn_if_negative_balance(user: &User) {
    if user.token_balance().is_negative() {
        warn!(user = user.id(), balance = %user.token_balance(), "token balance went negative");
    }
}

pub(crate) fn warn_if_negative_stake(user: &User) {
    if user.staked_amount().is_negative() {
        warn!(user = user.id(), staked = %user.staked_amount(), "staked amount went negative");
    }
}

pub(crate) fn warn_if_negative_staked_total(stats: &GlobalStats) {
    if stats.total_staked().is_negative() {
        warn!(total_staked = %stats.total_staked(), "global totalStaked went negative");
    }
}

pub(crate) fn warn_if_negative_supply(stats: &GlobalStats) {
    if stats.total_token_supply().is_negative() {
        warn!(supply = %stats.total_token_supply(), "global totalTokenSupply went negative");
    }
}
