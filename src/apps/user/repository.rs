use std::sync::Arc;

use crate::apps::user::User;
use crate::storage::{Dao, StorageError};

/// User persistence over whichever data source was wired in.
#[derive(Clone)]
pub struct UserRepository {
    dao: Arc<dyn Dao<User>>,
}

impl UserRepository {
    pub fn new(dao: Arc<dyn Dao<User>>) -> Self {
        Self { dao }
    }

    pub fn add(&self, user: User) -> Result<u64, StorageError> {
        self.dao.add(user)
    }

    pub fn get(&self, id: u64) -> Result<Option<User>, StorageError> {
        self.dao.get(id)
    }

    pub fn get_all(&self) -> Result<Vec<User>, StorageError> {
        self.dao.get_all()
    }

    pub fn find_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        Ok(self
            .dao
            .get_all()?
            .into_iter()
            .find(|user| user.email_address.eq_ignore_ascii_case(email)))
    }

    pub fn set(&self, user: User) -> Result<u64, StorageError> {
        self.dao.set(user)
    }

    pub fn del(&self, id: u64) -> Result<(), StorageError> {
        self.dao.del(id)
    }
}
