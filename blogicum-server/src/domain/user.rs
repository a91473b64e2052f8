use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            first_name: String::new(),
            last_name: String::new(),
            password_hash,
            created_at: Utc::now(),
        }
    }

    pub fn apply(&mut self, changes: ProfileDraft) {
        self.username = changes.username;
        self.email = changes.email;
        self.first_name = changes.first_name;
        self.last_name = changes.last_name;
    }
}

/// Validated profile fields, produced by the profile form.
#[derive(Debug, Clone)]
pub struct ProfileDraft {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone)]
pub struct RegistrationDraft {
    pub username: String,
    pub email: String,
    pub password: String,
}
