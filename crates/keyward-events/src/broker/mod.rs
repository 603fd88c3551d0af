//! Broker backends and the manager that selects one from configuration.

pub mod memory;
#[cfg(feature = "redis-broker")]
pub mod redis;

use std::sync::Arc;

use async_trait::async_trait;

use keyward_core::config::EventsConfig;
use keyward_core::error::AppError;
use keyward_core::result::AppResult;
use keyward_core::traits::MessageBroker;

pub use memory::{MemoryBroker, PublishedMessage};

/// Wraps the configured broker backend.
#[derive(Debug, Clone)]
pub struct BrokerManager {
    inner: Arc<dyn MessageBroker>,
}

impl BrokerManager {
    /// Create a broker from configuration.
    pub async fn new(config: &EventsConfig) -> AppResult<Self> {
        let inner: Arc<dyn MessageBroker> = match config.broker.as_str() {
            #[cfg(feature = "redis-broker")]
            "redis" => {
                tracing::info!("Initializing Redis event broker");
                Arc::new(self::redis::RedisBroker::connect(&config.redis_url).await?)
            }
            "memory" => {
                tracing::info!("Initializing in-memory event broker");
                Arc::new(MemoryBroker::new())
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown event broker: '{other}'. Supported: memory, redis"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Wrap an existing broker (for testing).
    pub fn from_broker(broker: Arc<dyn MessageBroker>) -> Self {
        Self { inner: broker }
    }
}

#[async_trait]
impl MessageBroker for BrokerManager {
    async fn publish(&self, topic: &str, key: &str, payload: &[u8]) -> AppResult<()> {
        self.inner.publish(topic, key, payload).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}
