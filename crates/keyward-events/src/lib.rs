//! Event delivery for Keyward.
//!
//! This crate provides:
//! - Message broker backends (in-process and Redis pub/sub)
//! - An [`EventPublisher`] that enqueues events without blocking the caller
//! - A [`PublishWorker`] that drains the queue, retries per configuration,
//!   and reports every outcome on a broadcast channel

pub mod broker;
pub mod publisher;
pub mod worker;

pub use broker::BrokerManager;
pub use publisher::{DeliveryOutcome, DeliveryReport, EventPublisher};
pub use worker::PublishWorker;
