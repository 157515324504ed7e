//! # Event Publisher
//!
//! Defines the publishing side of the event pipeline: the port the gateway
//! depends on, plus a zero-I/O in-memory adapter for deterministic tests.

use crate::correlation::CorrelationId;
use crate::error::EventError;
use crate::event::WebhookRequest;
use async_trait::async_trait;
use parking_lot::Mutex;

/// Trait for publishing accepted webhook events to the message bus.
///
/// The contract is one attempt per call, blocking until the bus
/// acknowledges durable acceptance (not merely "enqueued locally"). No
/// internal retry: the upstream webhook sender re-delivers on failure, and
/// downstream consumers are responsible for deduplication.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish one validated event, tagged with the request's correlation id.
    async fn publish(
        &self,
        event: &WebhookRequest,
        correlation_id: CorrelationId,
    ) -> Result<(), EventError>;
}

/// In-memory implementation of the publisher port.
///
/// Records every published event and can be armed to fail, so handler
/// behavior is exercised without a broker. Suitable only for tests and
/// local development.
#[derive(Default)]
pub struct InMemoryPublisher {
    published: Mutex<Vec<(WebhookRequest, CorrelationId)>>,
    fail_with: Mutex<Option<String>>,
}

impl InMemoryPublisher {
    /// Create a publisher that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm every subsequent publish to fail with the given cause; `None`
    /// restores normal operation.
    pub fn set_failure(&self, cause: Option<&str>) {
        *self.fail_with.lock() = cause.map(str::to_string);
    }

    /// Events published so far, in order.
    pub fn published(&self) -> Vec<WebhookRequest> {
        self.published
            .lock()
            .iter()
            .map(|(event, _)| event.clone())
            .collect()
    }

    /// Correlation ids attached to the published events, in order.
    pub fn correlation_ids(&self) -> Vec<CorrelationId> {
        self.published.lock().iter().map(|(_, id)| *id).collect()
    }

    /// Number of events published so far.
    pub fn publish_count(&self) -> usize {
        self.published.lock().len()
    }
}

#[async_trait]
impl EventPublisher for InMemoryPublisher {
    async fn publish(
        &self,
        event: &WebhookRequest,
        correlation_id: CorrelationId,
    ) -> Result<(), EventError> {
        if let Some(cause) = self.fail_with.lock().clone() {
            return Err(EventError::PublishFailed {
                topic: "in-memory".to_string(),
                cause,
            });
        }
        self.published.lock().push((event.clone(), correlation_id));
        Ok(())
    }
}
