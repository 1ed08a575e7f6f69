//! Handlers for the token contract: Transfer, TokensMinted, TokensBurned.
//!
//! Supply is tracked from Transfer events alone: a transfer out of the zero
//! address is a mint, a transfer into it is a burn. TokensMinted and
//! TokensBurned only make sure the counterparty exists; counting them too
//! would double the supply change.

use crate::accumulators::{get_or_create_global_stats, get_or_create_transaction, get_or_create_user};
use crate::diagnostics::{warn_if_negative_balance, warn_if_negative_supply};
use crate::error::ApplyError;
use crate::outcome::HandlerOutput;
use crate::scope::EventScope;
use staking_core::{activity_id, Address, Amount, Entity, EntityStore, IndexedEvent, Transfer, ZERO_ADDRESS};

pub fn handle_transfer<S: EntityStore + ?Sized>(
    scope: &mut EventScope<'_, S>,
    event: &IndexedEvent,
    from: &Address,
    to: &Address,
    amount: Amount,
) -> Result<HandlerOutput, ApplyError> {
    let at = event.block_timestamp;

    // Debit is saved before the credit loads so a self-transfer nets to zero.
    let mut sender = get_or_create_user(scope, from)?;
    sender.debit_tokens(amount)?;
    // The mint address is negative by construction.
    if *from != ZERO_ADDRESS {
        warn_if_negative_balance(&sender);
    }
    scope.save(&sender)?;

    let mut receiver = get_or_create_user(scope, to)?;
    receiver.credit_tokens(amount)?;
    scope.save(&receiver)?;

    let tx = get_or_create_transaction(scope, event)?;
    let id = activity_id(&event.tx_hash, event.log_index);
    let record = Transfer::new(id.clone(), &sender, &receiver, amount, at, &tx);
    scope.append(&record)?;

    let mut stats = get_or_create_global_stats(scope)?;
    if *from == ZERO_ADDRESS {
        stats.mint_supply(amount)?;
    } else if *to == ZERO_ADDRESS {
        stats.burn_supply(amount)?;
        warn_if_negative_supply(&stats);
    }
    stats.touch(at);
    scope.save(&stats)?;

    let mut users = vec![sender.id().to_string()];
    if from != to {
        users.push(receiver.id().to_string());
    }
    Ok(HandlerOutput {
        record_id: Some(id),
        users,
    })
}

pub fn handle_tokens_minted<S: EntityStore + ?Sized>(
    scope: &mut EventScope<'_, S>,
    event: &IndexedEvent,
    to: &Address,
) -> Result<HandlerOutput, ApplyError> {
    touch_counterparty(scope, event, to)
}

pub fn handle_tokens_burned<S: EntityStore + ?Sized>(
    scope: &mut EventScope<'_, S>,
    event: &IndexedEvent,
    from: &Address,
) -> Result<HandlerOutput, ApplyError> {
    touch_counterparty(scope, event, from)
}

fn touch_counterparty<S: EntityStore + ?Sized>(
    scope: &mut EventScope<'_, S>,
    event: &IndexedEvent,
    address: &Address,
) -> Result<HandlerOutput, ApplyError> {
    let user = get_or_create_user(scope, address)?;
    let mut stats = get_or_create_global_stats(scope)?;
    stats.touch(event.block_timestamp);
    scope.save(&stats)?;
    Ok(HandlerOutput {
        record_id: None,
        users: vec![user.id().to_string()],
    })
}
