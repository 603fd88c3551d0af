//! JWT token creation.

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};

use keyward_core::config::AuthConfig;
use keyward_core::error::AppError;
use keyward_core::types::UserId;

use super::claims::Claims;
use super::hmac_algorithm;

/// Signs claims with the configured HMAC algorithm and secret.
#[derive(Clone)]
pub struct JwtEncoder {
    encoding_key: EncodingKey,
    algorithm: Algorithm,
    /// Token lifetime.
    ttl: TimeDelta,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("algorithm", &self.algorithm)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Result<Self, AppError> {
        let ttl = i64::try_from(config.token_ttl_minutes)
            .ok()
            .and_then(TimeDelta::try_minutes)
            .ok_or_else(|| AppError::configuration("auth.token_ttl_minutes is too large"))?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            algorithm: hmac_algorithm(&config.jwt_algorithm)?,
            ttl,
        })
    }

    /// Builds claims `{sub, email, iat = now, exp = now + ttl}`.
    pub fn claims_for(&self, user_id: UserId, email: &str) -> Claims {
        let now = Utc::now();
        Claims {
            sub: user_id,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: now
                .checked_add_signed(self.ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
                .timestamp(),
        }
    }

    /// Signs the given claims.
    pub fn encode_claims(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(self.algorithm), claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyward_core::error::ErrorKind;

    #[test]
    fn test_out_of_range_ttl_is_configuration_error() {
        let err = JwtEncoder::new(&AuthConfig {
            token_ttl_minutes: u64::MAX,
            ..AuthConfig::default()
        })
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);

        let err = JwtEncoder::new(&AuthConfig {
            token_ttl_minutes: i64::MAX as u64,
            ..AuthConfig::default()
        })
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[test]
    fn test_claims_expire_after_configured_lifetime() {
        let encoder = JwtEncoder::new(&AuthConfig {
            token_ttl_minutes: 30,
            ..AuthConfig::default()
        })
        .unwrap();
        let claims = encoder.claims_for(UserId::new(), "a@test.com");
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }
}
