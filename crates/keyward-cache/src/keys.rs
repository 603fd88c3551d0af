//! Cache key builders.
//!
//! Session records are shared with other services reading the same Redis,
//! so the key layout is fixed: `token:<token>` with the user id as value.

/// Prefix for session token records.
const SESSION_PREFIX: &str = "token:";

/// Cache key under which an issued token's session record lives.
pub fn session_token(token: &str) -> String {
    format!("{SESSION_PREFIX}{token}")
}
