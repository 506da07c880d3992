use std::sync::Arc;

use serde::Deserialize;

use crate::apps::user::{User, UserRepository};
use crate::apps::ServiceError;
use crate::storage::Dao;

/// Registration and edit form. Missing fields deserialize as empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserForm {
    pub first: String,
    pub last: String,
    pub email: String,
    pub password: String,
}

pub struct UserService {
    repo: UserRepository,
}

impl UserService {
    pub fn new(repo: UserRepository) -> Self {
        Self { repo }
    }

    /// Create an active user. Email and password are required and the
    /// email must not be taken.
    pub fn register(&self, form: UserForm) -> Result<u64, ServiceError> {
        let email = form.email.trim();
        if email.is_empty() {
            return Err(ServiceError::MissingField("email"));
        }
        if form.password.is_empty() {
            return Err(ServiceError::MissingField("password"));
        }
        if self.repo.find_by_email(email)?.is_some() {
            return Err(ServiceError::Conflict(format!("email {}", email)));
        }

        let id = self.repo.add(User {
            id: 0,
            first_name: form.first.trim().to_string(),
            last_name: form.last.trim().to_string(),
            email_address: email.to_string(),
            password: form.password,
            is_active: true,
        })?;
        tracing::info!(user_id = id, "User registered");
        Ok(id)
    }

    pub fn find(&self, id: u64) -> Result<User, ServiceError> {
        self.repo
            .get(id)?
            .ok_or_else(|| ServiceError::NotFound(format!("user {}", id)))
    }

    pub fn all(&self) -> Result<Vec<User>, ServiceError> {
        Ok(self.repo.get_all()?)
    }

    /// Overwrite the non-empty form fields of user `id`.
    pub fn update(&self, id: u64, form: UserForm) -> Result<User, ServiceError> {
        let mut user = self.find(id)?;
        let email = form.email.trim();
        if !email.is_empty() && !email.eq_ignore_ascii_case(&user.email_address) {
            if self.repo.find_by_email(email)?.is_some() {
                return Err(ServiceError::Conflict(format!("email {}", email)));
            }
            user.email_address = email.to_string();
        }
        if !form.first.trim().is_empty() {
            user.first_name = form.first.trim().to_string();
        }
        if !form.last.trim().is_empty() {
            user.last_name = form.last.trim().to_string();
        }
        if !form.password.is_empty() {
            user.password = form.password;
        }
        self.repo.set(user.clone())?;
        Ok(user)
    }

    pub fn remove(&self, id: u64) -> Result<(), ServiceError> {
        self.find(id)?;
        self.repo.del(id)?;
        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }
}

/// Repository and service over `dao`.
pub fn wire_user(dao: Arc<dyn Dao<User>>) -> UserService {
    UserService::new(UserRepository::new(dao))
}
