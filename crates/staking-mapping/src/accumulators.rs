//! Get-or-create for the entities every handler shares.

use crate::error::ApplyError;
use crate::scope::EventScope;
use staking_core::{
    tx_id, user_id, Address, EntityStore, GlobalStats, IndexedEvent, Transaction, User,
    GLOBAL_STATS_ID,
};

pub fn get_or_create_user<S: EntityStore + ?Sized>(
    scope: &mut EventScope<'_, S>,
    address: &Address,
) -> Result<User, ApplyError> {
    let id = user_id(address);
    scope.get_or_create(&id, || User::new(id.clone()))
}

pub fn get_or_create_global_stats<S: EntityStore + ?Sized>(
    scope: &mut EventScope<'_, S>,
) -> Result<GlobalStats, ApplyError> {
    scope.get_or_create(GLOBAL_STATS_ID, GlobalStats::new)
}

/// Block metadata is taken from the first event of the transaction only.
pub fn get_or_create_transaction<S: EntityStore + ?Sized>(
    scope: &mut EventScope<'_, S>,
    event: &IndexedEvent,
) -> Result<Transaction, ApplyError> {
    let id = tx_id(&event.tx_hash);
    let block = event.block();
    scope.get_or_create(&id, || Transaction::new(id.clone(), &block))
}
