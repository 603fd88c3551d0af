//! Authentication orchestration.

mod guard;
pub mod service;

pub use service::{AuthService, DynUserStore};
