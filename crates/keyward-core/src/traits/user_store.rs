//! User store contract consumed by the authentication core.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::UserId;

/// Relational storage for user accounts.
///
/// The store is generic over the user and new-user shapes so that this
/// crate stays free of entity definitions.
///
/// Error contract:
/// - `save` fails with [`crate::ErrorKind::EmailExists`] or
///   [`crate::ErrorKind::UsernameExists`] when the matching unique
///   constraint is violated, and with an infrastructure kind otherwise.
/// - `find_by_email` fails with [`crate::ErrorKind::NotFound`] when no
///   account has that email.
#[async_trait]
pub trait UserStore: Send + Sync + std::fmt::Debug + 'static {
    /// Stored user record.
    type User: Send + Sync + 'static;
    /// Data needed to create a user.
    type NewUser: Send + Sync + 'static;

    /// Persist a new user and return its id.
    async fn save(&self, user: &Self::NewUser) -> AppResult<UserId>;

    /// Look a user up by (normalized) email.
    async fn find_by_email(&self, email: &str) -> AppResult<Self::User>;
}
