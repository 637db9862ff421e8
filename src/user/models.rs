use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::types::UserProfile;

/// Database model for the users table
#[derive(Debug, Clone, FromRow, Serialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub username: String, // Unique login name
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when registering a user; the store assigns id and timestamps
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub password_hash: String,
}

impl User {
    /// Materialises a stored user from registration data
    pub fn from_new(id: i64, new_user: NewUser) -> Self {
        let now = Utc::now();

        Self {
            id,
            name: new_user.name,
            username: new_user.username,
            password_hash: new_user.password_hash,
            created_at: now,
            updated_at: now,
        }
    }

    /// Public view returned by the API
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            username: self.username.clone(),
            registered_at: self.created_at.timestamp(),
        }
    }

    #[cfg(test)]
    pub fn for_tests(id: i64, username: &str) -> Self {
        Self::from_new(
            id,
            NewUser {
                name: format!("{} name", username),
                username: username.to_string(),
                password_hash: String::new(),
            },
        )
    }
}
