//! # keyward-service
//!
//! The authentication core. [`AuthService`] composes the credential
//! verifier, token service, session cache, and event publisher into the
//! four public operations: register, login, logout, and token validation.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time. Every operation that touches a dependency takes a
//! [`RequestContext`] whose cancellation token is honored on each call.

pub mod auth;
pub mod context;

pub use auth::{AuthService, DynUserStore};
pub use context::RequestContext;
