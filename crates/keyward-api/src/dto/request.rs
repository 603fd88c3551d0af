//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use keyward_entity::user::UserProfile;

/// Registration request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address. Normalized by the service.
    #[validate(email(message = "Email is malformed"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Optional username.
    #[serde(default)]
    #[validate(length(max = 100))]
    pub username: Option<String>,
    /// Optional given name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Optional family name.
    #[serde(default)]
    pub last_name: Option<String>,
}

impl RegisterRequest {
    /// Splits the optional fields off into a profile.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address.
    #[validate(email(message = "Email is malformed"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token validation request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ValidateRequest {
    /// Bearer token to check.
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
}
