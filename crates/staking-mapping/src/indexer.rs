use crate::error::ApplyError;
use crate::outcome::HandlerOutput;
use crate::scope::EventScope;
use crate::{staking, token};
use serde::{Deserialize, Serialize};
use staking_core::{
    activity_id, ContractEvent, EntityStore, EventCursor, IndexedEvent, TokenAddressSource,
};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyOutcome {
    Applied,
    AlreadyApplied,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyReceipt {
    pub outcome: ApplyOutcome,
    pub cursor: EventCursor,
    pub event: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<String>,
}

/// Applies events to a store, one atomic commit per event.
///
/// Events must arrive in log order. An event whose `{tx}-{logIndex}` marker
/// is stored has already been applied and is skipped, so a driver may replay
/// from an earlier block after a restart. An unseen event at or before the
/// stored cursor is rejected with [`ApplyError::OutOfOrder`].
pub struct Indexer<S, T> {
    store: S,
    tokens: T,
}

impl<S: EntityStore, T: TokenAddressSource> Indexer<S, T> {
    pub fn new(store: S, tokens: T) -> Self {
        Self { store, tokens }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn apply(&self, event: &IndexedEvent) -> Result<ApplyReceipt, ApplyError> {
        let cursor = event.cursor();
        let event_id = activity_id(&event.tx_hash, event.log_index);
        if self.store.is_applied(&event_id)? {
            debug!(
                block = cursor.block_number,
                log_index = cursor.log_index,
                "event already applied"
            );
            return Ok(ApplyReceipt {
                outcome: ApplyOutcome::AlreadyApplied,
                cursor,
                event: event.event.name(),
                record_id: None,
                users: Vec::new(),
            });
        }
        if let Some(done) = self.store.cursor()? {
            if cursor <= done {
                warn!(
                    tx_hash = %event.tx_hash,
                    block = cursor.block_number,
                    log_index = cursor.log_index,
                    last_block = done.block_number,
                    last_log_index = done.log_index,
                    "event arrived out of order"
                );
                return Err(ApplyError::OutOfOrder {
                    cursor: done,
                    event: cursor,
                });
            }
        }

        let mut scope = EventScope::new(&self.store);
        let out = handle_event(&mut scope, event, &self.tokens)?;
        let mut batch = scope.into_batch();
        batch.set_cursor(cursor);
        batch.mark_applied(event_id);
        self.store.commit(batch)?;

        debug!(
            event = event.event.name(),
            block = cursor.block_number,
            log_index = cursor.log_index,
            "event applied"
        );
        Ok(ApplyReceipt {
            outcome: ApplyOutcome::Applied,
            cursor,
            event: event.event.name(),
            record_id: out.record_id,
            users: out.users,
        })
    }

    /// Stops at the first failing event; everything before it stays committed.
    pub fn apply_all<'a, I>(&self, events: I) -> Result<Vec<ApplyReceipt>, ApplyError>
    where
        I: IntoIterator<Item = &'a IndexedEvent>,
    {
        events.into_iter().map(|ev| self.apply(ev)).collect()
    }
}

/// Route one event to its handler. Writes land in `scope` only.
pub fn handle_event<S, T>(
    scope: &mut EventScope<'_, S>,
    event: &IndexedEvent,
    tokens: &T,
) -> Result<HandlerOutput, ApplyError>
where
    S: EntityStore + ?Sized,
    T: TokenAddressSource + ?Sized,
{
    match &event.event {
        ContractEvent::Staked { user, amount } => {
            staking::handle_staked(scope, event, user, *amount, tokens)
        }
        ContractEvent::Withdrawn { user, amount } => {
            staking::handle_withdrawn(scope, event, user, *amount)
        }
        ContractEvent::RewardClaimed { user, amount } => {
            staking::handle_reward_claimed(scope, event, user, *amount)
        }
        ContractEvent::RewardRateUpdated { new_rate } => {
            staking::handle_reward_rate_updated(scope, event, *new_rate)
        }
        ContractEvent::Transfer { from, to, amount } => {
            token::handle_transfer(scope, event, from, to, *amount)
        }
        ContractEvent::TokensMinted { to, .. } => token::handle_tokens_minted(scope, event, to),
        ContractEvent::TokensBurned { from, .. } => {
            token::handle_tokens_burned(scope, event, from)
        }
    }
}
