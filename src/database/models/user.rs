use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::types::RecordId;

/// A registered account.
///
/// The password hash and the live token list never leave the server: both are
/// skipped when the user is serialized for a client.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: RecordId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub tokens: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::generate(),
            username: username.into(),
            password_hash: password_hash.into(),
            tokens: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_token(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }
}

/// Row shape of the `users` table
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub tokens: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = crate::types::InvalidRecordId;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: RecordId::parse(&row.id)?,
            username: row.username,
            password_hash: row.password_hash,
            tokens: row.tokens,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
