//! Publish worker: drains the event queue into the broker.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use keyward_core::error::AppError;
use keyward_core::traits::MessageBroker;

use crate::publisher::{DeliveryOutcome, DeliveryReport, QueuedEvent};

/// Why a single delivery attempt failed.
#[derive(Debug, thiserror::Error)]
enum AttemptError {
    /// The broker did not answer in time.
    #[error("publish timed out after {0:?}")]
    Timeout(Duration),

    /// The broker rejected the message.
    #[error("{0}")]
    Broker(#[from] AppError),
}

/// Delivers queued events to the broker, one at a time.
#[derive(Debug)]
pub struct PublishWorker {
    rx: mpsc::Receiver<QueuedEvent>,
    broker: Arc<dyn MessageBroker>,
    reports: broadcast::Sender<DeliveryReport>,
    topic: String,
    max_attempts: u32,
    retry_backoff: Duration,
    publish_timeout: Duration,
}

impl PublishWorker {
    pub(crate) fn new(
        rx: mpsc::Receiver<QueuedEvent>,
        broker: Arc<dyn MessageBroker>,
        reports: broadcast::Sender<DeliveryReport>,
        topic: String,
        max_attempts: u32,
        retry_backoff: Duration,
        publish_timeout: Duration,
    ) -> Self {
        Self {
            rx,
            broker,
            reports,
            topic,
            max_attempts,
            retry_backoff,
            publish_timeout,
        }
    }

    /// Run the worker on its own task.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }

    /// Deliver events until `cancel` fires or every publisher is dropped.
    /// On cancellation, events already queued are still delivered.
    pub async fn run(mut self, cancel: CancellationToken) {
        tracing::info!(
            "Publish worker started: topic='{}', max_attempts={}",
            self.topic,
            self.max_attempts
        );

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!("Publish worker received shutdown signal");
                    break;
                }
                next = self.rx.recv() => match next {
                    Some(event) => self.deliver(event).await,
                    None => {
                        tracing::info!("Event queue closed");
                        break;
                    }
                },
            }
        }

        self.rx.close();
        let mut drained = 0usize;
        while let Ok(event) = self.rx.try_recv() {
            self.deliver(event).await;
            drained += 1;
        }

        tracing::info!("Publish worker stopped ({} queued events drained)", drained);
    }

    async fn deliver(&self, event: QueuedEvent) {
        let mut attempts = 0;
        let outcome = loop {
            attempts += 1;
            match self.attempt(&event).await {
                Ok(()) => break DeliveryOutcome::Delivered,
                Err(e) if attempts < self.max_attempts => {
                    tracing::warn!(
                        "Event {} delivery attempt {}/{} failed: {}",
                        event.event_id,
                        attempts,
                        self.max_attempts,
                        e
                    );
                    tokio::time::sleep(self.retry_backoff).await;
                }
                Err(e) => {
                    tracing::error!(
                        "Event {} dropped after {} attempt(s): {}",
                        event.event_id,
                        attempts,
                        e
                    );
                    break DeliveryOutcome::Failed(e.to_string());
                }
            }
        };

        if outcome == DeliveryOutcome::Delivered {
            tracing::debug!("Event {} delivered to '{}'", event.event_id, self.topic);
        }

        // Nobody listening is fine.
        let _ = self.reports.send(DeliveryReport {
            event_id: event.event_id,
            topic: self.topic.clone(),
            attempts,
            outcome,
        });
    }

    async fn attempt(&self, event: &QueuedEvent) -> Result<(), AttemptError> {
        tokio::time::timeout(
            self.publish_timeout,
            self.broker.publish(&self.topic, &event.key, &event.payload),
        )
        .await
        .map_err(|_| AttemptError::Timeout(self.publish_timeout))??;
        Ok(())
    }
}
