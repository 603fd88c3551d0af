//! Core type definitions used across the Keyward workspace.

pub mod id;

pub use id::UserId;
