//! Custom Axum extractors.

pub mod auth;
pub mod context;
pub mod json;

pub use auth::BearerToken;
pub use context::Ctx;
pub use json::ValidatedJson;
