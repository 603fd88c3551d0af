//! Signed session tokens.
//!
//! Tokens are HMAC-signed JWTs. Validation is stateless: signature and
//! expiry only. Revocation lives in [`crate::session::SessionCache`].

pub mod claims;
pub mod decoder;
pub mod encoder;

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::Algorithm;
use tracing::debug;

use keyward_core::config::AuthConfig;
use keyward_core::config::auth::HMAC_ALGORITHMS;
use keyward_core::error::AppError;
use keyward_core::result::AppResult;
use keyward_core::types::UserId;

pub use claims::Claims;
pub use decoder::JwtDecoder;
pub use encoder::JwtEncoder;

/// Parses a configured algorithm name, accepting only the HMAC family.
pub(crate) fn hmac_algorithm(name: &str) -> AppResult<Algorithm> {
    match name {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => Err(AppError::configuration(format!(
            "Unsupported token algorithm '{other}'. Supported: {}",
            HMAC_ALGORITHMS.join(", ")
        ))),
    }
}

pub(crate) fn is_hmac(algorithm: Algorithm) -> bool {
    matches!(
        algorithm,
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
    )
}

/// A freshly signed token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// The encoded JWT.
    pub token: String,
    /// Subject the token was issued to.
    pub user_id: UserId,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
    /// Remaining lifetime at issuance; never exceeds `expires_at - now`.
    pub ttl: Duration,
}

/// Issues and validates session tokens.
#[derive(Debug, Clone)]
pub struct TokenService {
    encoder: JwtEncoder,
    decoder: JwtDecoder,
}

impl TokenService {
    /// Builds the service. Fails with `Configuration` for a non-HMAC
    /// algorithm.
    pub fn new(config: &AuthConfig) -> AppResult<Self> {
        Ok(Self {
            encoder: JwtEncoder::new(config)?,
            decoder: JwtDecoder::new(config)?,
        })
    }

    /// Signs a token for `user_id`.
    pub fn issue(&self, user_id: UserId, email: &str) -> AppResult<IssuedToken> {
        let claims = self.encoder.claims_for(user_id, email);
        let token = self.encoder.encode_claims(&claims)?;

        Ok(IssuedToken {
            token,
            user_id,
            expires_at: claims.expires_at(),
            ttl: claims.remaining_ttl(),
        })
    }

    /// Decodes a token, reporting the rejection reason as `InvalidToken`.
    pub fn decode_claims(&self, token: &str) -> AppResult<Claims> {
        self.decoder.decode_claims(token.trim())
    }

    /// Returns the subject of a valid token, or `None` for any invalid one.
    pub fn validate(&self, token: &str) -> Option<UserId> {
        match self.decode_claims(token) {
            Ok(claims) => Some(claims.sub),
            Err(e) => {
                debug!(reason = %e.message, "Token rejected");
                None
            }
        }
    }

    /// The encoder, for callers that sign custom claims.
    pub fn encoder(&self) -> &JwtEncoder {
        &self.encoder
    }
}
