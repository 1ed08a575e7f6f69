//! Entity store seam.
//!
//! The reducer only needs keyed reads, a keyspace scan for traversal
//! queries, and an atomic multi-key commit. Values are JSON documents of
//! the entity types in [`crate::entities`].

use crate::entities::{Entity, EntityKind};
use crate::events::EventCursor;
use std::collections::BTreeMap;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("backend error: {0}")]
    Backend(String),
    #[error("encode error: {0}")]
    Encode(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("schema mismatch: expected {expected}, found {found:?}")]
    SchemaMismatch {
        expected: String,
        found: Option<String>,
    },
}

/// Pending writes for one event, committed all-or-nothing.
///
/// Repeated puts of the same `(kind, id)` coalesce, last write wins.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    entries: BTreeMap<(EntityKind, String), Vec<u8>>,
    cursor: Option<EventCursor>,
    applied: Option<String>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, kind: EntityKind, id: impl Into<String>, value: Vec<u8>) {
        self.entries.insert((kind, id.into()), value);
    }

    pub fn get(&self, kind: EntityKind, id: &str) -> Option<&[u8]> {
        self.entries
            .get(&(kind, id.to_string()))
            .map(Vec::as_slice)
    }

    pub fn set_cursor(&mut self, cursor: EventCursor) {
        self.cursor = Some(cursor);
    }

    pub fn cursor(&self) -> Option<EventCursor> {
        self.cursor
    }

    /// Records that the event with this id (`{tx}-{logIndex}`) is applied.
    pub fn mark_applied(&mut self, event_id: impl Into<String>) {
        self.applied = Some(event_id.into());
    }

    pub fn applied(&self) -> Option<&str> {
        self.applied.as_deref()
    }

    pub fn entries(&self) -> impl Iterator<Item = (EntityKind, &str, &[u8])> {
        self.entries
            .iter()
            .map(|((kind, id), v)| (*kind, id.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.cursor.is_none() && self.applied.is_none()
    }
}

/// Durable key-value table per entity kind.
pub trait EntityStore {
    fn get(&self, kind: EntityKind, id: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// All values of a keyspace, ordered by id.
    fn scan(&self, kind: EntityKind) -> Result<Vec<Vec<u8>>, StoreError>;

    /// Last event committed through [`EntityStore::commit`].
    fn cursor(&self) -> Result<Option<EventCursor>, StoreError>;

    /// Whether a batch marked with this event id was committed.
    fn is_applied(&self, event_id: &str) -> Result<bool, StoreError>;

    /// Apply every write in the batch atomically.
    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;
}

impl<S: EntityStore + ?Sized> EntityStore for &S {
    fn get(&self, kind: EntityKind, id: &str) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(kind, id)
    }

    fn scan(&self, kind: EntityKind) -> Result<Vec<Vec<u8>>, StoreError> {
        (**self).scan(kind)
    }

    fn cursor(&self) -> Result<Option<EventCursor>, StoreError> {
        (**self).cursor()
    }

    fn is_applied(&self, event_id: &str) -> Result<bool, StoreError> {
        (**self).is_applied(event_id)
    }

    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        (**self).commit(batch)
    }
}

pub fn encode_entity<E: Entity>(entity: &E) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec(entity)
        .map_err(|e| StoreError::Encode(format!("failed encoding {} json: {e}", E::KIND)))
}

pub fn decode_entity<E: Entity>(bytes: &[u8]) -> Result<E, StoreError> {
    serde_json::from_slice::<E>(bytes)
        .map_err(|e| StoreError::Decode(format!("failed decoding {} json: {e}", E::KIND)))
}

/// Typed keyed read.
pub fn load<E: Entity, S: EntityStore + ?Sized>(
    store: &S,
    id: &str,
) -> Result<Option<E>, StoreError> {
    let Some(v) = store.get(E::KIND, id)? else {
        return Ok(None);
    };
    decode_entity(&v).map(Some)
}
