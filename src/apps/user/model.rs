use rusqlite::Row;
use serde::{Deserialize, Serialize};

use crate::sorm_model;
use crate::storage::{Entity, FromRow};

sorm_model! {
    /// A registered user.
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct User {
        pub id: u64 => "id,pk",
        pub first_name: String => "first_name",
        pub last_name: String => "last_name",
        pub email_address: String => "email_address",
        #[serde(skip_serializing)]
        pub password: String => "password",
        pub is_active: bool => "is_active",
    }
}

impl Entity for User {
    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
}

impl FromRow for User {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get::<_, i64>("id")? as u64,
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            email_address: row.get("email_address")?,
            password: row.get("password")?,
            is_active: row.get("is_active")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sorm::Table;

    #[test]
    fn test_user_table() {
        let table = Table::from_model(&User::default());
        assert_eq!(table.name, "user");
        assert_eq!(
            table.insert_sql(),
            "INSERT INTO user(first_name, last_name, email_address, password, is_active) VALUES (?,?,?,?,?);"
        );
    }

    #[test]
    fn test_password_not_serialized() {
        let user = User {
            id: 1,
            email_address: "a@b.c".to_string(),
            password: "secret".to_string(),
            ..User::default()
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("a@b.c"));
        assert!(!json.contains("secret"));
    }
}
