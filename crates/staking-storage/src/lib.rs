#![forbid(unsafe_code)]
#![deny(clippy::float_arithmetic)]
#![deny(clippy::float_cmp)]
#![deny(clippy::cast_possible_truncation)]

//! Entity storage for the staking/token indexer.
//!
//! [`SledEntityStore`] keeps every entity kind in one sled tree under
//! `"{kind}:{id}"` keys, next to the `meta:` keys (schema version, cursor),
//! so a whole event's writes land in a single atomic `apply_batch`.
//! [`MemoryEntityStore`] uses the same key layout in a `BTreeMap`.

mod memory;

pub use memory::MemoryEntityStore;

use staking_core::{EntityKind, EntityStore, EventCursor, StoreError, WriteBatch};
use std::path::Path;
use tracing::{debug, info};

pub const SCHEMA_VERSION: &str = "1";

#[derive(Debug, Clone)]
pub struct SledEntityStore {
    db: sled::Db,
    tree: sled::Tree,
}

impl SledEntityStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = sled::open(path).map_err(backend)?;
        let tree = db.open_tree("staking-index").map_err(backend)?;
        let store = Self { db, tree };
        store.init_schema()?;
        Ok(store)
    }

    /// Block until every committed batch is on disk.
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush().map_err(backend)?;
        Ok(())
    }

    pub fn schema_version(&self) -> Result<Option<String>, StoreError> {
        Ok(self
            .tree
            .get(keys::schema_version())
            .map_err(backend)?
            .map(|v| String::from_utf8_lossy(&v).to_string()))
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        match self.schema_version()? {
            Some(current) => {
                if current != SCHEMA_VERSION {
                    return Err(StoreError::SchemaMismatch {
                        expected: SCHEMA_VERSION.to_string(),
                        found: Some(current),
                    });
                }
            }
            None => {
                self.tree
                    .insert(keys::schema_version(), SCHEMA_VERSION.as_bytes())
                    .map_err(backend)?;
                info!(schema = SCHEMA_VERSION, "initialized schema version");
            }
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn tree(&self) -> &sled::Tree {
        &self.tree
    }
}

impl EntityStore for SledEntityStore {
    fn get(&self, kind: EntityKind, id: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self
            .tree
            .get(keys::entity(kind, id))
            .map_err(backend)?
            .map(|v| v.to_vec()))
    }

    fn scan(&self, kind: EntityKind) -> Result<Vec<Vec<u8>>, StoreError> {
        let mut out = Vec::new();
        for item in self.tree.scan_prefix(keys::kind_prefix(kind)) {
            let (_key, value) = item.map_err(backend)?;
            out.push(value.to_vec());
        }
        Ok(out)
    }

    fn cursor(&self) -> Result<Option<EventCursor>, StoreError> {
        let Some(v) = self.tree.get(keys::cursor()).map_err(backend)? else {
            return Ok(None);
        };
        decode_cursor(&v).map(Some)
    }

    fn is_applied(&self, event_id: &str) -> Result<bool, StoreError> {
        self.tree
            .contains_key(keys::applied(event_id))
            .map_err(backend)
    }

    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut sled_batch = sled::Batch::default();
        for (kind, id, value) in batch.entries() {
            sled_batch.insert(keys::entity(kind, id), value);
        }
        if let Some(cursor) = batch.cursor() {
            sled_batch.insert(keys::cursor(), encode_cursor(&cursor)?);
        }
        if let Some(id) = batch.applied() {
            sled_batch.insert(keys::applied(id), &[][..]);
        }
        self.tree.apply_batch(sled_batch).map_err(backend)?;
        debug!(writes = batch.len(), "committed write batch");
        Ok(())
    }
}

pub mod keys {
    use staking_core::EntityKind;

    pub fn entity(kind: EntityKind, id: &str) -> Vec<u8> {
        format!("{}:{id}", kind.as_str()).into_bytes()
    }

    pub fn kind_prefix(kind: EntityKind) -> Vec<u8> {
        format!("{}:", kind.as_str()).into_bytes()
    }

    /// Marker for an applied event, keyed by `{tx}-{logIndex}`.
    pub fn applied(event_id: &str) -> Vec<u8> {
        format!("meta:applied:{event_id}").into_bytes()
    }

    pub fn cursor() -> &'static [u8] {
        b"meta:cursor"
    }

    pub fn schema_version() -> &'static [u8] {
        b"meta:schema_version"
    }
}

pub(crate) fn encode_cursor(cursor: &EventCursor) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec(cursor).map_err(|e| StoreError::Encode(format!("cursor: {e}")))
}

pub(crate) fn decode_cursor(bytes: &[u8]) -> Result<EventCursor, StoreError> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::Decode(format!("cursor: {e}")))
}

fn backend(e: sled::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}
