//! # keyward-entity
//!
//! Domain entity models for Keyward. Database entities derive
//! `sqlx::FromRow`; password hashes are never serialized and are redacted
//! from `Debug` output.

pub mod user;

pub use user::{NewUser, User, UserProfile};
