//! Non-blocking publication of user-created events.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use keyward_core::config::EventsConfig;
use keyward_core::error::AppError;
use keyward_core::events::UserCreatedEvent;
use keyward_core::result::AppResult;
use keyward_core::traits::MessageBroker;

use crate::worker::PublishWorker;

/// Buffer size of the delivery report channel.
const REPORT_BUFFER: usize = 256;

/// An encoded event waiting for the worker.
#[derive(Debug, Clone)]
pub(crate) struct QueuedEvent {
    pub(crate) event_id: Uuid,
    pub(crate) key: String,
    pub(crate) payload: Vec<u8>,
}

/// Final result of delivering one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The broker accepted the event.
    Delivered,
    /// Every attempt failed; carries the last failure reason.
    Failed(String),
}

/// Emitted by the worker once per dequeued event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    /// The event's ID.
    pub event_id: Uuid,
    /// Topic the event was published to.
    pub topic: String,
    /// Number of attempts made.
    pub attempts: u32,
    /// How delivery ended.
    pub outcome: DeliveryOutcome,
}

impl DeliveryReport {
    /// Returns `true` if the event reached the broker.
    pub fn is_delivered(&self) -> bool {
        self.outcome == DeliveryOutcome::Delivered
    }
}

/// Enqueues events for the [`PublishWorker`]. Cheap to clone.
///
/// Publishing never waits on the broker: events go onto a bounded queue
/// and [`publish`](Self::publish) fails immediately when it is full.
/// Delivery is best-effort.
#[derive(Debug, Clone)]
pub struct EventPublisher {
    tx: mpsc::Sender<QueuedEvent>,
    reports: broadcast::Sender<DeliveryReport>,
}

impl EventPublisher {
    /// Create a publisher and the worker that drains its queue.
    pub fn new(config: &EventsConfig, broker: Arc<dyn MessageBroker>) -> (Self, PublishWorker) {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let (reports, _) = broadcast::channel(REPORT_BUFFER);

        let worker = PublishWorker::new(
            rx,
            broker,
            reports.clone(),
            config.topic.clone(),
            config.max_attempts.max(1),
            Duration::from_millis(config.retry_backoff_ms),
            Duration::from_millis(config.publish_timeout_ms),
        );

        (Self { tx, reports }, worker)
    }

    /// Encode `event` and enqueue it. Returns the event ID.
    ///
    /// Fails with `Serialization` if encoding fails and with `Broker` if
    /// the queue is full or the worker has stopped.
    pub fn publish(&self, event: &UserCreatedEvent) -> AppResult<Uuid> {
        let queued = QueuedEvent {
            event_id: event.event_id,
            key: event.partition_key().to_string(),
            payload: serde_json::to_vec(event)?,
        };

        self.tx.try_send(queued).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => AppError::broker("event queue is full"),
            mpsc::error::TrySendError::Closed(_) => AppError::broker("event worker has stopped"),
        })?;

        Ok(event.event_id)
    }

    /// Subscribe to delivery reports for events dequeued from now on.
    pub fn subscribe_reports(&self) -> broadcast::Receiver<DeliveryReport> {
        self.reports.subscribe()
    }
}
