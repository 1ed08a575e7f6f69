//! In-memory store with the same key layout as the sled store.

use crate::{decode_cursor, encode_cursor, keys};
use staking_core::{EntityKind, EntityStore, EventCursor, StoreError, WriteBatch};
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemoryEntityStore {
    map: Mutex<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_map<T>(
        &self,
        f: impl FnOnce(&mut BTreeMap<Vec<u8>, Vec<u8>>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut map = self
            .map
            .lock()
            .map_err(|_| StoreError::Backend("mutex poisoned".to_string()))?;
        f(&mut map)
    }
}

impl EntityStore for MemoryEntityStore {
    fn get(&self, kind: EntityKind, id: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.with_map(|m| Ok(m.get(&keys::entity(kind, id)).cloned()))
    }

    fn scan(&self, kind: EntityKind) -> Result<Vec<Vec<u8>>, StoreError> {
        let prefix = keys::kind_prefix(kind);
        self.with_map(|m| {
            Ok(m.range(prefix.clone()..)
                .take_while(|(k, _)| k.starts_with(&prefix))
                .map(|(_, v)| v.clone())
                .collect())
        })
    }

    fn cursor(&self) -> Result<Option<EventCursor>, StoreError> {
        let raw = self.with_map(|m| Ok(m.get(keys::cursor()).cloned()))?;
        raw.map(|v| decode_cursor(&v)).transpose()
    }

    fn is_applied(&self, event_id: &str) -> Result<bool, StoreError> {
        self.with_map(|m| Ok(m.contains_key(&keys::applied(event_id))))
    }

    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let cursor = batch.cursor().map(|c| encode_cursor(&c)).transpose()?;
        self.with_map(|m| {
            for (kind, id, value) in batch.entries() {
                m.insert(keys::entity(kind, id), value.to_vec());
            }
            if let Some(c) = cursor {
                m.insert(keys::cursor().to_vec(), c);
            }
            if let Some(id) = batch.applied() {
                m.insert(keys::applied(id), Vec::new());
            }
            Ok(())
        })
    }
}
