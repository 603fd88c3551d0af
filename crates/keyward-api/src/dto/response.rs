//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use keyward_core::types::UserId;

/// Registration response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    /// ID of the new user.
    pub user_id: UserId,
}

/// Login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Signed bearer token.
    pub token: String,
    /// Token subject.
    pub user_id: UserId,
    /// Token expiration.
    pub expires_at: DateTime<Utc>,
}

/// Token validation response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateResponse {
    /// Token subject.
    pub user_id: UserId,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"ok"` when every dependency answers, `"degraded"` otherwise.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Cache status: `"up"` or `"down"`.
    pub cache: String,
    /// Broker status: `"up"` or `"down"`.
    pub broker: String,
}
