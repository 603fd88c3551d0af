//! Redis pub/sub broker.
//!
//! Redis channels have no partitions, so the message key is only logged;
//! consumers read the partition key from the event body.

use async_trait::async_trait;
use redis::Client;
use redis::aio::ConnectionManager;

use keyward_core::error::{AppError, ErrorKind};
use keyward_core::result::AppResult;
use keyward_core::traits::MessageBroker;

/// Publishes events with Redis `PUBLISH`.
#[derive(Clone)]
pub struct RedisBroker {
    conn: ConnectionManager,
}

impl std::fmt::Debug for RedisBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisBroker").finish_non_exhaustive()
    }
}

impl RedisBroker {
    /// Connect to the Redis server at `url`.
    pub async fn connect(url: &str) -> AppResult<Self> {
        let client = Client::open(url).map_err(|e| {
            AppError::with_source(ErrorKind::Broker, "Failed to create Redis client", e)
        })?;

        let conn = ConnectionManager::new(client).await.map_err(|e| {
            AppError::with_source(ErrorKind::Broker, "Failed to connect to Redis", e)
        })?;

        tracing::info!("Connected Redis event broker");
        Ok(Self { conn })
    }

    fn map_err(e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::Broker, format!("Redis PUBLISH failed: {e}"), e)
    }
}

#[async_trait]
impl MessageBroker for RedisBroker {
    async fn publish(&self, topic: &str, key: &str, payload: &[u8]) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let receivers: i64 = redis::cmd("PUBLISH")
            .arg(topic)
            .arg(payload)
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        tracing::debug!(topic, key, receivers, "Published event to Redis");
        Ok(())
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.conn.clone();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(pong == "PONG")
    }
}
