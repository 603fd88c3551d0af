//! PostgreSQL user store.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use keyward_core::error::{AppError, ErrorKind};
use keyward_core::result::AppResult;
use keyward_core::traits::UserStore;
use keyward_core::types::UserId;
use keyward_entity::user::{NewUser, User};

/// Unique constraint on `users.email`.
const EMAIL_CONSTRAINT: &str = "users_email_key";
/// Unique constraint on `users.username`.
const USERNAME_CONSTRAINT: &str = "users_username_key";

/// [`UserStore`] backed by the `users` table.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Create a new user store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map an insert failure onto the store's error contract.
fn map_insert_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            match db_err.constraint() {
                Some(EMAIL_CONSTRAINT) => return AppError::email_exists(),
                Some(USERNAME_CONSTRAINT) => return AppError::username_exists(),
                _ => {}
            }
        }
    }
    AppError::with_source(ErrorKind::Database, "Failed to create user", e)
}

#[async_trait]
impl UserStore for PgUserStore {
    type User = User;
    type NewUser = NewUser;

    async fn save(&self, user: &NewUser) -> AppResult<UserId> {
        let id = UserId::new();
        sqlx::query_scalar::<_, UserId>(
            "INSERT INTO users (id, email, username, first_name, last_name, password_hash) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id",
        )
        .bind(id)
        .bind(&user.email)
        .bind(&user.profile.username)
        .bind(&user.profile.first_name)
        .bind(&user.profile.last_name)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, username, first_name, last_name, password_hash, created_at \
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find user by email", e)
        })?;

        user.ok_or_else(|| {
            debug!("No user row for email lookup");
            AppError::not_found("user not found")
        })
    }
}
