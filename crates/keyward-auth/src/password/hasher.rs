//! Argon2id password hashing and verification.

use std::sync::Arc;

use argon2::password_hash::rand_core::{OsRng, RngCore};
use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use keyward_core::config::PasswordConfig;
use keyward_core::error::{AppError, ErrorKind};
use keyward_core::result::AppResult;

/// Salt length in bytes.
const SALT_LEN: usize = 16;

/// Plaintext hashed once at startup to build the decoy hash.
const DECOY_PLAINTEXT: &str = "keyward-decoy-credential";

/// Hashes and verifies passwords using Argon2id.
///
/// Cost parameters are written into every PHC string, and [`verify`]
/// reads them back from the stored hash, so changing the configured cost
/// never invalidates existing hashes.
///
/// [`verify`]: CredentialVerifier::verify
#[derive(Clone)]
pub struct CredentialVerifier {
    params: Params,
    /// Hash compared against when the account does not exist.
    decoy_hash: Arc<str>,
}

impl std::fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVerifier")
            .field("memory_kib", &self.params.m_cost())
            .field("iterations", &self.params.t_cost())
            .field("parallelism", &self.params.p_cost())
            .finish()
    }
}

impl CredentialVerifier {
    /// Builds a verifier from configured cost parameters.
    pub fn new(config: &PasswordConfig) -> AppResult<Self> {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
            .map_err(|e| AppError::configuration(format!("Invalid Argon2 parameters: {e}")))?;

        let mut verifier = Self {
            params,
            decoy_hash: Arc::from(""),
        };
        verifier.decoy_hash = Arc::from(verifier.hash(DECOY_PLAINTEXT)?);
        Ok(verifier)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hashes `plaintext` with a fresh random salt into a PHC string.
    ///
    /// Any input, including the empty string, hashes successfully; the only
    /// failures are entropy or parameter errors, reported as `Internal`.
    pub fn hash(&self, plaintext: &str) -> AppResult<String> {
        let mut salt_bytes = [0u8; SALT_LEN];
        OsRng
            .try_fill_bytes(&mut salt_bytes)
            .map_err(|e| AppError::internal(format!("Failed to gather salt entropy: {e}")))?;
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| AppError::internal(format!("Failed to encode salt: {e}")))?;

        let hash = self
            .argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        Ok(hash.to_string())
    }

    /// Verifies `plaintext` against a stored PHC hash.
    ///
    /// Returns `Ok(false)` on mismatch. A hash that cannot be parsed or
    /// evaluated is an `Internal` error rather than a mismatch.
    pub fn verify(&self, hash: &str, plaintext: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Stored password hash is malformed: {e}")))?;

        match self.argon2().verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!(
                "Password verification failed: {e}"
            ))),
        }
    }

    /// Runs a verification against the decoy hash and discards the result.
    pub fn verify_dummy(&self, plaintext: &str) {
        let _ = self.verify(&self.decoy_hash, plaintext);
    }

    /// [`hash`](Self::hash) on the blocking thread pool.
    pub async fn hash_blocking(&self, plaintext: String) -> AppResult<String> {
        let verifier = self.clone();
        tokio::task::spawn_blocking(move || verifier.hash(&plaintext))
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "Hashing task failed", e))?
    }

    /// [`verify`](Self::verify) on the blocking thread pool.
    pub async fn verify_blocking(&self, hash: String, plaintext: String) -> AppResult<bool> {
        let verifier = self.clone();
        tokio::task::spawn_blocking(move || verifier.verify(&hash, &plaintext))
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "Verification task failed", e))?
    }

    /// [`verify_dummy`](Self::verify_dummy) on the blocking thread pool.
    pub async fn verify_dummy_blocking(&self, plaintext: String) {
        let verifier = self.clone();
        let _ = tokio::task::spawn_blocking(move || verifier.verify_dummy(&plaintext)).await;
    }
}
