//! In-process user store.
//!
//! Enforces the same uniqueness rules as the `users` table so the
//! authentication core behaves identically against either store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use keyward_core::error::AppError;
use keyward_core::result::AppResult;
use keyward_core::traits::UserStore;
use keyward_core::types::UserId;
use keyward_entity::user::{NewUser, User};

/// [`UserStore`] held in memory. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    /// Users keyed by normalized email.
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    /// Returns `true` when no users are stored.
    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    type User = User;
    type NewUser = NewUser;

    async fn save(&self, user: &NewUser) -> AppResult<UserId> {
        let mut users = self.users.write().await;

        if users.contains_key(&user.email) {
            return Err(AppError::email_exists());
        }
        if let Some(username) = &user.profile.username {
            if users
                .values()
                .any(|u| u.username.as_deref() == Some(username.as_str()))
            {
                return Err(AppError::username_exists());
            }
        }

        let id = UserId::new();
        users.insert(
            user.email.clone(),
            User {
                id,
                email: user.email.clone(),
                username: user.profile.username.clone(),
                first_name: user.profile.first_name.clone(),
                last_name: user.profile.last_name.clone(),
                password_hash: user.password_hash.clone(),
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<User> {
        self.users
            .read()
            .await
            .get(email)
            .cloned()
            .ok_or_else(|| AppError::not_found("user not found"))
    }
}
