//! JWT token validation.

use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};

use keyward_core::config::AuthConfig;
use keyward_core::error::AppError;

use super::claims::Claims;
use super::{hmac_algorithm, is_hmac};

/// Verifies token signatures and expiry.
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Result<Self, AppError> {
        let algorithm: Algorithm = hmac_algorithm(&config.jwt_algorithm)?;

        let mut validation = Validation::new(algorithm);
        validation.validate_exp = true;
        validation.leeway = config.leeway_seconds;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        })
    }

    /// Decodes and validates a token string.
    ///
    /// Checks, in order:
    /// 1. The header parses and declares an HMAC algorithm
    /// 2. Signature validity under the configured algorithm and secret
    /// 3. Expiration (with leeway)
    /// 4. Claim shape
    pub fn decode_claims(&self, token: &str) -> Result<Claims, AppError> {
        let header = decode_header(token)
            .map_err(|e| AppError::invalid_token(format!("Malformed token header: {e}")))?;

        if !is_hmac(header.alg) {
            return Err(AppError::invalid_token(format!(
                "Token algorithm {:?} is not accepted",
                header.alg
            )));
        }

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    JwtErrorKind::ExpiredSignature => AppError::invalid_token("Token has expired"),
                    JwtErrorKind::InvalidSignature => {
                        AppError::invalid_token("Invalid token signature")
                    }
                    JwtErrorKind::InvalidAlgorithm => {
                        AppError::invalid_token("Token algorithm does not match")
                    }
                    JwtErrorKind::InvalidToken => AppError::invalid_token("Invalid token format"),
                    _ => AppError::invalid_token(format!("Token validation failed: {e}")),
                }
            })?;

        Ok(token_data.claims)
    }
}
