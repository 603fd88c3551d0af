//! Session records kept in the cache for explicit revocation.

pub mod store;

pub use store::SessionCache;
