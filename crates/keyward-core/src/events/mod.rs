//! Domain events emitted by Keyward operations.
//!
//! Events are handed to the event publisher, which delivers them to the
//! configured message broker on a background worker.

pub mod user;

pub use user::UserCreatedEvent;
