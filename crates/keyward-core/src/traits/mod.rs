//! Contracts defined in `keyward-core` and implemented by adapter crates.

pub mod broker;
pub mod cache;
pub mod user_store;

pub use broker::MessageBroker;
pub use cache::CacheProvider;
pub use user_store::UserStore;
