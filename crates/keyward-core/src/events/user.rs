//! User-related domain events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::UserId;

/// Published once per successful registration. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCreatedEvent {
    /// Unique event ID, used to correlate delivery reports.
    pub event_id: Uuid,
    /// The new user's ID.
    pub user_id: UserId,
    /// The username, if the user registered with one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// The normalized email address.
    pub email: String,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

impl UserCreatedEvent {
    /// Create a new event for the given user.
    pub fn new(user_id: UserId, username: Option<String>, email: impl Into<String>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            user_id,
            username,
            email: email.into(),
            created_at: Utc::now(),
        }
    }

    /// Broker partition key: the username when present, else the email.
    pub fn partition_key(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.email)
    }
}
