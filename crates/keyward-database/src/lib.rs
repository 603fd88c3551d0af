//! # keyward-database
//!
//! PostgreSQL connection management and the [`UserStore`] implementations
//! used by Keyward: [`PgUserStore`] for production and [`MemoryUserStore`]
//! for tests and single-process runs.
//!
//! [`UserStore`]: keyward_core::traits::UserStore

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use memory::MemoryUserStore;
pub use repositories::PgUserStore;
