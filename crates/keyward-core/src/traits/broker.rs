//! Message broker trait for event delivery backends.

use async_trait::async_trait;

use crate::result::AppResult;

/// A destination for serialized domain events.
///
/// Implementations report failures with [`crate::ErrorKind::Broker`]; the
/// caller decides whether to retry.
#[async_trait]
pub trait MessageBroker: Send + Sync + std::fmt::Debug + 'static {
    /// Publish one message to `topic`, keyed by `key`.
    async fn publish(&self, topic: &str, key: &str, payload: &[u8]) -> AppResult<()>;

    /// Check that the broker is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
