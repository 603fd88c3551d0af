//! In-process broker for single-node deployments and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{RwLock, broadcast};

use keyward_core::result::AppResult;
use keyward_core::traits::MessageBroker;

/// Buffer size for per-topic subscriber channels.
const SUBSCRIBER_BUFFER: usize = 256;

/// A message as it reached the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    /// Destination topic.
    pub topic: String,
    /// Partition key.
    pub key: String,
    /// Encoded event.
    pub payload: Vec<u8>,
}

/// Records every published message and rebroadcasts it to subscribers.
#[derive(Debug, Default)]
pub struct MemoryBroker {
    /// Every message published so far, in order.
    log: RwLock<Vec<PublishedMessage>>,
    /// Topic name → broadcast sender
    topics: RwLock<HashMap<String, broadcast::Sender<PublishedMessage>>>,
}

impl MemoryBroker {
    /// Create an empty broker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to messages published to `topic` from now on.
    pub async fn subscribe(&self, topic: &str) -> broadcast::Receiver<PublishedMessage> {
        let mut topics = self.topics.write().await;
        topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(SUBSCRIBER_BUFFER).0)
            .subscribe()
    }

    /// Snapshot of every message published so far.
    pub async fn messages(&self) -> Vec<PublishedMessage> {
        self.log.read().await.clone()
    }
}

#[async_trait]
impl MessageBroker for MemoryBroker {
    async fn publish(&self, topic: &str, key: &str, payload: &[u8]) -> AppResult<()> {
        let message = PublishedMessage {
            topic: topic.to_string(),
            key: key.to_string(),
            payload: payload.to_vec(),
        };

        self.log.write().await.push(message.clone());

        let topics = self.topics.read().await;
        if let Some(tx) = topics.get(topic) {
            // No receivers is fine.
            let _ = tx.send(message);
        }
        Ok(())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_records_and_broadcasts() {
        let broker = MemoryBroker::new();
        let mut rx = broker.subscribe("user-created").await;

        broker
            .publish("user-created", "alice", b"payload")
            .await
            .unwrap();
        broker.publish("other", "bob", b"x").await.unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.key, "alice");
        assert_eq!(received.payload, b"payload");

        let log = broker.messages().await;
        assert_eq!(log.len(), 2);
        assert_eq!(log[1].topic, "other");
    }
}
