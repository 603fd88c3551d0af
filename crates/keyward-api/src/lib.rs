//! # keyward-api
//!
//! HTTP API layer for Keyward built on Axum.
//!
//! Exposes the register, login, logout, and validate endpoints plus a
//! health probe. Request bodies are validated at the boundary; domain
//! errors are mapped to status codes in [`error`].

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
