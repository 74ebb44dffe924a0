//! Session model

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Login session, looked up by the token stored in the `session` cookie
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Session ID (token)
    pub id: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Start a new session for `user_id` that expires after `lifetime`
    pub fn start(user_id: i64, lifetime: Duration) -> Result<Self> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(lifetime)
            .with_context(|| format!("Session lifetime out of range: {}", lifetime))?;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            expires_at,
            created_at: now,
        })
    }

    /// Seconds between creation and expiry
    pub fn max_age_seconds(&self) -> i64 {
        (self.expires_at - self.created_at).num_seconds()
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}
