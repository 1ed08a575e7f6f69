//! Per-event read/write overlay.

use crate::error::ApplyError;
use staking_core::{decode_entity, encode_entity, Entity, EntityStore, WriteBatch};

/// Everything one handler invocation reads and writes.
///
/// Reads see this event's own staged writes before the store; nothing
/// reaches the store until the scope's batch is committed.
pub struct EventScope<'s, S: EntityStore + ?Sized> {
    store: &'s S,
    writes: WriteBatch,
}

impl<'s, S: EntityStore + ?Sized> EventScope<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            writes: WriteBatch::new(),
        }
    }

    pub fn load<E: Entity>(&self, id: &str) -> Result<Option<E>, ApplyError> {
        if let Some(staged) = self.writes.get(E::KIND, id) {
            return Ok(Some(decode_entity(staged)?));
        }
        match self.store.get(E::KIND, id)? {
            Some(v) => Ok(Some(decode_entity(&v)?)),
            None => Ok(None),
        }
    }

    pub fn exists<E: Entity>(&self, id: &str) -> Result<bool, ApplyError> {
        if self.writes.get(E::KIND, id).is_some() {
            return Ok(true);
        }
        Ok(self.store.get(E::KIND, id)?.is_some())
    }

    pub fn save<E: Entity>(&mut self, entity: &E) -> Result<(), ApplyError> {
        let bytes = encode_entity(entity)?;
        self.writes.put(E::KIND, entity.id(), bytes);
        Ok(())
    }

    /// Load by id; when absent, build with `create`, stage it, and return it.
    pub fn get_or_create<E: Entity>(
        &mut self,
        id: &str,
        create: impl FnOnce() -> E,
    ) -> Result<E, ApplyError> {
        if let Some(existing) = self.load::<E>(id)? {
            return Ok(existing);
        }
        let fresh = create();
        self.save(&fresh)?;
        Ok(fresh)
    }

    /// Stage an append-only log record. Records are never rewritten.
    pub fn append<E: Entity>(&mut self, record: &E) -> Result<(), ApplyError> {
        if self.exists::<E>(record.id())? {
            return Err(ApplyError::RecordExists {
                kind: E::KIND,
                id: record.id().to_string(),
            });
        }
        self.save(record)
    }

    pub fn into_batch(self) -> WriteBatch {
        self.writes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use staking_core::{load, User};
    use staking_storage::MemoryEntityStore;

    #[test]
    fn get_or_create_twice_returns_equal_entities() {
        let store = MemoryEntityStore::new();
        let mut scope = EventScope::new(&store);
        let a = scope.get_or_create("0xaa", || User::new("0xaa")).unwrap();
        let b: User = scope
            .get_or_create("0xaa", || panic!("must not create twice"))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn staged_writes_are_invisible_until_commit() {
        let store = MemoryEntityStore::new();
        let mut scope = EventScope::new(&store);
        let mut u = User::new("0xaa");
        u.credit_tokens(5u64.into()).unwrap();
        scope.save(&u).unwrap();

        let staged: User = scope.load("0xaa").unwrap().expect("staged");
        assert_eq!(staged, u);
        assert!(load::<User, _>(&store, "0xaa").unwrap().is_none());

        store.commit(scope.into_batch()).unwrap();
        assert_eq!(load::<User, _>(&store, "0xaa").unwrap(), Some(u));
    }

    #[test]
    fn append_refuses_to_rewrite_a_record() {
        let store = MemoryEntityStore::new();
        let mut scope = EventScope::new(&store);
        let u = User::new("0xaa");
        scope.append(&u).unwrap();
        let err = scope.append(&u).unwrap_err();
        assert!(matches!(err, ApplyError::RecordExists { .. }), "{err}");
    }
}
