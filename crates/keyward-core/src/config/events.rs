//! Event publishing configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Configuration for the user-created event queue and broker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Broker backend: `"memory"` or `"redis"`.
    #[serde(default = "default_broker")]
    pub broker: String,
    /// Topic (Redis channel) user-created events are published to.
    #[serde(default = "default_topic")]
    pub topic: String,
    /// Redis URL for the `"redis"` broker.
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
    /// Maximum number of events waiting for the publish worker.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Delivery attempts per event. `1` means best-effort with no retry.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Pause between delivery attempts in milliseconds.
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,
    /// Deadline for a single broker publish call in milliseconds.
    #[serde(default = "default_publish_timeout")]
    pub publish_timeout_ms: u64,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            broker: default_broker(),
            topic: default_topic(),
            redis_url: default_redis_url(),
            queue_capacity: default_queue_capacity(),
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_retry_backoff(),
            publish_timeout_ms: default_publish_timeout(),
        }
    }
}

impl EventsConfig {
    /// Rejects a zero-sized queue or zero attempts.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.queue_capacity == 0 {
            return Err(AppError::configuration(
                "events.queue_capacity must be greater than zero",
            ));
        }
        if self.max_attempts == 0 {
            return Err(AppError::configuration(
                "events.max_attempts must be at least 1",
            ));
        }
        Ok(())
    }
}

fn default_broker() -> String {
    "memory".to_string()
}

fn default_topic() -> String {
    "user-created".to_string()
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_max_attempts() -> u32 {
    1
}

fn default_retry_backoff() -> u64 {
    250
}

fn default_publish_timeout() -> u64 {
    5000
}
