//! # keyward-auth
//!
//! The credential primitives Keyward's authentication core composes.
//!
//! ## Modules
//!
//! - `password` — Argon2id hashing and constant-time verification
//! - `jwt` — HMAC-signed token issuance and validation with an explicit
//!   algorithm guard
//! - `session` — token → subject records in the session cache, used for
//!   revocation

pub mod jwt;
pub mod password;
pub mod session;

pub use jwt::{Claims, IssuedToken, JwtDecoder, JwtEncoder, TokenService};
pub use password::CredentialVerifier;
pub use session::SessionCache;
