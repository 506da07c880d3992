//! Entity storage behind a data-access trait.
//!
//! # Responsibilities
//! - Define the `Entity` and `Dao` contracts the apps program against
//! - Provide an in-memory data source and a SQLite one
//!
//! # Design Decisions
//! - `Dao` is synchronous; both backends finish in microseconds
//! - Ids are `u64` and `0` means "not assigned yet"
//! - Deleting a missing id is not an error

use std::sync::atomic::{AtomicU64, Ordering};

use crate::sorm::SormError;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryDataSource;
pub use sqlite::{FromRow, SqliteDataSource};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("no entity with id {0}")]
    NotFound(u64),

    #[error("entity with id {0} already exists")]
    AlreadyExists(u64),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Sorm(#[from] SormError),

    #[error("connection lock poisoned")]
    Poisoned,
}

/// A stored record addressed by a numeric id.
pub trait Entity: Clone + Send + Sync + 'static {
    fn id(&self) -> u64;

    fn set_id(&mut self, id: u64);
}

/// Data-access object for one entity type.
pub trait Dao<E: Entity>: Send + Sync {
    /// Store a new entity and return its id.
    fn add(&self, entity: E) -> Result<u64, StorageError>;

    fn get(&self, id: u64) -> Result<Option<E>, StorageError>;

    /// Every entity, ordered by id.
    fn get_all(&self) -> Result<Vec<E>, StorageError>;

    /// Insert or overwrite; returns the id used.
    fn set(&self, entity: E) -> Result<u64, StorageError>;

    fn del(&self, id: u64) -> Result<(), StorageError>;
}

/// Monotonic id source starting at 1.
#[derive(Debug, Default)]
pub struct AutoId(AtomicU64);

impl AutoId {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Make sure later ids are greater than `id`.
    pub fn observe(&self, id: u64) {
        self.0.fetch_max(id, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_id() {
        let ids = AutoId::new();
        assert_eq!(ids.next(), 1);
        assert_eq!(ids.next(), 2);
        ids.observe(10);
        assert_eq!(ids.next(), 11);
        ids.observe(3);
        assert_eq!(ids.next(), 12);
    }
}
