//! In-memory data source.

use std::sync::Arc;

use dashmap::DashMap;

use crate::storage::{AutoId, Dao, Entity, StorageError};

/// Entities held in a concurrent map. Clones share the same map.
#[derive(Debug, Clone)]
pub struct MemoryDataSource<E> {
    items: Arc<DashMap<u64, E>>,
    ids: Arc<AutoId>,
}

impl<E: Entity> MemoryDataSource<E> {
    pub fn new() -> Self {
        Self {
            items: Arc::new(DashMap::new()),
            ids: Arc::new(AutoId::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<E: Entity> Default for MemoryDataSource<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> Dao<E> for MemoryDataSource<E> {
    /// A zero or unknown id is replaced by a fresh one.
    fn add(&self, mut entity: E) -> Result<u64, StorageError> {
        let id = entity.id();
        if id != 0 && self.items.contains_key(&id) {
            return Err(StorageError::AlreadyExists(id));
        }
        let id = self.ids.next();
        entity.set_id(id);
        self.items.insert(id, entity);
        Ok(id)
    }

    fn get(&self, id: u64) -> Result<Option<E>, StorageError> {
        Ok(self.items.get(&id).map(|entry| entry.value().clone()))
    }

    fn get_all(&self) -> Result<Vec<E>, StorageError> {
        let mut all: Vec<E> = self.items.iter().map(|entry| entry.value().clone()).collect();
        all.sort_by_key(|e| e.id());
        Ok(all)
    }

    fn set(&self, mut entity: E) -> Result<u64, StorageError> {
        let id = match entity.id() {
            0 => {
                let id = self.ids.next();
                entity.set_id(id);
                id
            }
            id => {
                self.ids.observe(id);
                id
            }
        };
        self.items.insert(id, entity);
        Ok(id)
    }

    fn del(&self, id: u64) -> Result<(), StorageError> {
        self.items.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Note {
        id: u64,
        body: String,
    }

    impl Entity for Note {
        fn id(&self) -> u64 {
            self.id
        }

        fn set_id(&mut self, id: u64) {
            self.id = id;
        }
    }

    fn note(id: u64, body: &str) -> Note {
        Note {
            id,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_add_assigns_ids() {
        let ds = MemoryDataSource::new();
        assert_eq!(ds.add(note(0, "a")).unwrap(), 1);
        assert_eq!(ds.add(note(0, "b")).unwrap(), 2);
        assert_eq!(ds.add(note(99, "c")).unwrap(), 3);
        assert_eq!(ds.get(3).unwrap().unwrap().body, "c");
        assert!(matches!(
            ds.add(note(1, "dup")),
            Err(StorageError::AlreadyExists(1))
        ));
    }

    #[test]
    fn test_get_all_ordered() {
        let ds = MemoryDataSource::new();
        ds.set(note(5, "five")).unwrap();
        ds.set(note(2, "two")).unwrap();
        ds.add(note(0, "six")).unwrap();

        let ids: Vec<u64> = ds.get_all().unwrap().iter().map(|n| n.id).collect();
        assert_eq!(ids, [2, 5, 6]);
    }

    #[test]
    fn test_set_upserts() {
        let ds = MemoryDataSource::new();
        let id = ds.set(note(0, "draft")).unwrap();
        ds.set(note(id, "final")).unwrap();

        assert_eq!(ds.len(), 1);
        assert_eq!(ds.get(id).unwrap().unwrap().body, "final");
    }

    #[test]
    fn test_del_idempotent() {
        let ds = MemoryDataSource::new();
        let id = ds.add(note(0, "gone")).unwrap();
        ds.del(id).unwrap();
        ds.del(id).unwrap();
        assert!(ds.get(id).unwrap().is_none());
        assert!(ds.is_empty());
    }
}
