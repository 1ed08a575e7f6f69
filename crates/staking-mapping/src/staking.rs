//! Handlers for the staking contract: Staked, Withdrawn, RewardClaimed,
//! RewardRateUpdated.

use crate::accumulators::{get_or_create_global_stats, get_or_create_transaction, get_or_create_user};
use crate::diagnostics::{warn_if_negative_stake, warn_if_negative_staked_total};
use crate::error::ApplyError;
use crate::outcome::HandlerOutput;
use crate::scope::EventScope;
use staking_core::{
    activity_id, address_hex, ActivityKind, Address, Amount, Entity, EntityStore, GlobalStats,
    IndexedEvent, StakingActivity, TokenAddressSource, User,
};
use tracing::info;

pub fn handle_staked<S, T>(
    scope: &mut EventScope<'_, S>,
    event: &IndexedEvent,
    user: &Address,
    amount: Amount,
    tokens: &T,
) -> Result<HandlerOutput, ApplyError>
where
    S: EntityStore + ?Sized,
    T: TokenAddressSource + ?Sized,
{
    let at = event.block_timestamp;
    let mut u = get_or_create_user(scope, user)?;
    u.stake(amount, at)?;
    scope.save(&u)?;

    let record_id = append_activity(scope, event, &u, ActivityKind::Stake, amount)?;

    let mut stats = get_or_create_global_stats(scope)?;
    stats.add_staked(amount)?;
    stats.touch(at);
    if !stats.contracts_bound() {
        bind_contracts(&mut stats, event.contract, tokens)?;
    }
    warn_if_negative_staked_total(&stats);
    scope.save(&stats)?;

    Ok(HandlerOutput {
        record_id: Some(record_id),
        users: vec![u.id().to_string()],
    })
}

pub fn handle_withdrawn<S: EntityStore + ?Sized>(
    scope: &mut EventScope<'_, S>,
    event: &IndexedEvent,
    user: &Address,
    amount: Amount,
) -> Result<HandlerOutput, ApplyError> {
    let at = event.block_timestamp;
    let mut u = get_or_create_user(scope, user)?;
    u.withdraw(amount)?;
    warn_if_negative_stake(&u);
    scope.save(&u)?;

    let record_id = append_activity(scope, event, &u, ActivityKind::Withdraw, amount)?;

    let mut stats = get_or_create_global_stats(scope)?;
    stats.sub_staked(amount)?;
    stats.touch(at);
    warn_if_negative_staked_total(&stats);
    scope.save(&stats)?;

    Ok(HandlerOutput {
        record_id: Some(record_id),
        users: vec![u.id().to_string()],
    })
}

pub fn handle_reward_claimed<S: EntityStore + ?Sized>(
    scope: &mut EventScope<'_, S>,
    event: &IndexedEvent,
    user: &Address,
    amount: Amount,
) -> Result<HandlerOutput, ApplyError> {
    let at = event.block_timestamp;
    let mut u = get_or_create_user(scope, user)?;
    u.claim(amount, at)?;
    scope.save(&u)?;

    let record_id = append_activity(scope, event, &u, ActivityKind::Claim, amount)?;

    let mut stats = get_or_create_global_stats(scope)?;
    stats.add_rewards_paid(amount)?;
    stats.touch(at);
    scope.save(&stats)?;

    Ok(HandlerOutput {
        record_id: Some(record_id),
        users: vec![u.id().to_string()],
    })
}

/// Configuration only: no activity record.
pub fn handle_reward_rate_updated<S: EntityStore + ?Sized>(
    scope: &mut EventScope<'_, S>,
    event: &IndexedEvent,
    new_rate: Amount,
) -> Result<HandlerOutput, ApplyError> {
    let mut stats = get_or_create_global_stats(scope)?;
    stats.set_reward_rate(new_rate);
    stats.touch(event.block_timestamp);
    scope.save(&stats)?;
    Ok(HandlerOutput::default())
}

fn append_activity<S: EntityStore + ?Sized>(
    scope: &mut EventScope<'_, S>,
    event: &IndexedEvent,
    user: &User,
    kind: ActivityKind,
    amount: Amount,
) -> Result<String, ApplyError> {
    let tx = get_or_create_transaction(scope, event)?;
    let id = activity_id(&event.tx_hash, event.log_index);
    let activity = StakingActivity::new(id.clone(), user, kind, amount, event.block_timestamp, &tx);
    scope.append(&activity)?;
    Ok(id)
}

fn bind_contracts<T: TokenAddressSource + ?Sized>(
    stats: &mut GlobalStats,
    staking_contract: Address,
    tokens: &T,
) -> Result<(), ApplyError> {
    let token = tokens.staking_token(staking_contract)?;
    let staking = address_hex(&staking_contract);
    let token = address_hex(&token);
    if stats.bind_contracts(&staking, &token) {
        info!(staking = %staking, token = %token, "bound staking and token contracts");
    }
    Ok(())
}
