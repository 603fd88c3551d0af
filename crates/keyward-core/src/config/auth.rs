//! Authentication configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Algorithms accepted for signing and verifying tokens.
pub const HMAC_ALGORITHMS: [&str; 3] = ["HS256", "HS384", "HS512"];

/// Environments allowed to run with the shipped placeholder secret.
pub const INSECURE_SECRET_ENVIRONMENTS: [&str; 2] = ["development", "test"];

/// Shortest secret accepted outside [`INSECURE_SECRET_ENVIRONMENTS`], in bytes.
pub const MIN_SECRET_BYTES: usize = 32;

/// Longest accepted token lifetime: one year.
pub const MAX_TOKEN_TTL_MINUTES: u64 = 365 * 24 * 60;

const PLACEHOLDER_SECRET: &str = "CHANGE_ME_IN_PRODUCTION";

/// Token issuance and dependency-call configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret for HMAC token signing. Process-wide, never persisted.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Signing algorithm; must be one of [`HMAC_ALGORITHMS`].
    #[serde(default = "default_jwt_algorithm")]
    pub jwt_algorithm: String,
    /// Token lifetime in minutes.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_minutes: u64,
    /// Clock-skew leeway applied to `exp` during validation, in seconds.
    #[serde(default = "default_leeway")]
    pub leeway_seconds: u64,
    /// Deadline for every user store / cache call, in milliseconds.
    #[serde(default = "default_dependency_timeout")]
    pub dependency_timeout_ms: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            jwt_algorithm: default_jwt_algorithm(),
            token_ttl_minutes: default_token_ttl(),
            leeway_seconds: default_leeway(),
            dependency_timeout_ms: default_dependency_timeout(),
        }
    }
}

impl AuthConfig {
    /// Rejects an empty secret, an out-of-range lifetime, or a non-HMAC
    /// algorithm. Outside `development` and `test`, the placeholder secret
    /// and secrets shorter than [`MIN_SECRET_BYTES`] are rejected too.
    pub fn validate(&self, env: &str) -> Result<(), AppError> {
        if self.jwt_secret.is_empty() {
            return Err(AppError::configuration("auth.jwt_secret must not be empty"));
        }
        if !INSECURE_SECRET_ENVIRONMENTS.contains(&env) {
            if self.jwt_secret == PLACEHOLDER_SECRET {
                return Err(AppError::configuration(format!(
                    "auth.jwt_secret is the placeholder value; set KEYWARD__AUTH__JWT_SECRET for '{env}'"
                )));
            }
            if self.jwt_secret.len() < MIN_SECRET_BYTES {
                return Err(AppError::configuration(format!(
                    "auth.jwt_secret must be at least {MIN_SECRET_BYTES} bytes in '{env}'"
                )));
            }
        }
        if self.token_ttl_minutes == 0 || self.token_ttl_minutes > MAX_TOKEN_TTL_MINUTES {
            return Err(AppError::configuration(format!(
                "auth.token_ttl_minutes must be between 1 and {MAX_TOKEN_TTL_MINUTES}"
            )));
        }
        if !HMAC_ALGORITHMS.contains(&self.jwt_algorithm.as_str()) {
            return Err(AppError::configuration(format!(
                "auth.jwt_algorithm '{}' is not supported. Supported: {}",
                self.jwt_algorithm,
                HMAC_ALGORITHMS.join(", ")
            )));
        }
        Ok(())
    }
}

/// Argon2id cost parameters used for new password hashes.
///
/// The parameters are written into every PHC hash string, so changing them
/// only affects hashes produced afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordConfig {
    /// Memory cost in KiB.
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    /// Number of passes.
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Degree of parallelism.
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

impl PasswordConfig {
    /// Rejects parameters Argon2 would refuse at hash time.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.iterations == 0 || self.parallelism == 0 {
            return Err(AppError::configuration(
                "password.iterations and password.parallelism must be at least 1",
            ));
        }
        if self.memory_kib < 8 * self.parallelism {
            return Err(AppError::configuration(
                "password.memory_kib must be at least 8 * parallelism",
            ));
        }
        Ok(())
    }
}

fn default_jwt_secret() -> String {
    PLACEHOLDER_SECRET.to_string()
}

fn default_jwt_algorithm() -> String {
    "HS256".to_string()
}

fn default_token_ttl() -> u64 {
    24 * 60
}

fn default_leeway() -> u64 {
    5
}

fn default_dependency_timeout() -> u64 {
    3000
}

// Argon2id defaults recommended by OWASP (19 MiB, 2 passes, 1 lane).
fn default_memory_kib() -> u32 {
    19 * 1024
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}
