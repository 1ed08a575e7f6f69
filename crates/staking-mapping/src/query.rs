//! Read side: keyed lookups and reference traversal.
//!
//! Records point at users and transactions, never the other way round, so
//! reverse lookups scan the record keyspace. Lists come back oldest first:
//! by timestamp, then log index.

use staking_core::{
    decode_entity, load, user_id, Address, Entity, EntityStore, GlobalStats, StakingActivity,
    StoreError, Transaction, Transfer, User, GLOBAL_STATS_ID,
};

pub fn user<S: EntityStore + ?Sized>(store: &S, address: &Address) -> Result<Option<User>, StoreError> {
    load(store, &user_id(address))
}

pub fn global_stats<S: EntityStore + ?Sized>(store: &S) -> Result<Option<GlobalStats>, StoreError> {
    load(store, GLOBAL_STATS_ID)
}

pub fn transaction<S: EntityStore + ?Sized>(
    store: &S,
    id: &str,
) -> Result<Option<Transaction>, StoreError> {
    load(store, id)
}

/// Log index from a `{tx}-{logIndex}` record id. Log indices are unique
/// within a block, so they order records sharing a timestamp.
fn log_order(record_id: &str) -> u64 {
    record_id
        .rsplit_once('-')
        .and_then(|(_, i)| i.parse().ok())
        .unwrap_or(u64::MAX)
}

pub fn all<E: Entity, S: EntityStore + ?Sized>(store: &S) -> Result<Vec<E>, StoreError> {
    store
        .scan(E::KIND)?
        .iter()
        .map(|v| decode_entity(v))
        .collect()
}

/// Activities of one user, oldest first.
pub fn activities_for_user<S: EntityStore + ?Sized>(
    store: &S,
    address: &Address,
) -> Result<Vec<StakingActivity>, StoreError> {
    let id = user_id(address);
    let mut out: Vec<StakingActivity> = all::<StakingActivity, _>(store)?
        .into_iter()
        .filter(|a| a.user() == id)
        .collect();
    out.sort_by_key(|a| (a.timestamp(), log_order(a.id())));
    Ok(out)
}

/// Transfers the user sent or received, oldest first.
pub fn transfers_for_user<S: EntityStore + ?Sized>(
    store: &S,
    address: &Address,
) -> Result<Vec<Transfer>, StoreError> {
    let id = user_id(address);
    let mut out: Vec<Transfer> = all::<Transfer, _>(store)?
        .into_iter()
        .filter(|t| t.from() == id || t.to() == id)
        .collect();
    out.sort_by_key(|t| (t.timestamp(), log_order(t.id())));
    Ok(out)
}

/// Everything logged under one transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct TransactionRecords {
    pub activities: Vec<StakingActivity>,
    pub transfers: Vec<Transfer>,
}

pub fn records_for_transaction<S: EntityStore + ?Sized>(
    store: &S,
    tx: &str,
) -> Result<TransactionRecords, StoreError> {
    let activities = all::<StakingActivity, _>(store)?
        .into_iter()
        .filter(|a| a.transaction() == tx)
        .collect();
    let transfers = all::<Transfer, _>(store)?
        .into_iter()
        .filter(|t| t.transaction() == tx)
        .collect();
    Ok(TransactionRecords {
        activities,
        transfers,
    })
}
