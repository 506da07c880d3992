//! Username/password accounts backing the login flow.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;

/// An account known to the auth store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemUser {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: String,
}

/// Account registry consulted by the login handler.
pub trait AuthUser: Send + Sync {
    /// Add or replace the account for `username`.
    fn register(&self, username: &str, password: &str, role: &str);

    /// The account matching both `username` and `password`.
    fn authenticate(&self, username: &str, password: &str) -> Option<SystemUser>;
}

/// Accounts held in memory with their plain passwords.
#[derive(Debug, Clone, Default)]
pub struct BasicAuthUser {
    users: Arc<DashMap<String, SystemUser>>,
}

impl BasicAuthUser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl AuthUser for BasicAuthUser {
    fn register(&self, username: &str, password: &str, role: &str) {
        self.users.insert(
            username.to_string(),
            SystemUser {
                username: username.to_string(),
                password: password.to_string(),
                role: role.to_string(),
            },
        );
    }

    fn authenticate(&self, username: &str, password: &str) -> Option<SystemUser> {
        self.users
            .get(username)
            .filter(|user| user.password == password)
            .map(|user| user.clone())
    }
}
