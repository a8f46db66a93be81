use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const USER_COLLECTION: &str = "users";

/// Stored credential. `password` holds the bcrypt hash, never the plain text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user: String,
    pub password: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn new(user: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: None,
            user: user.into(),
            password: password_hash.into(),
            created_at: Utc::now(),
        }
    }
}
