//! Kafka adapter for the publisher port.

use crate::config::BusConfig;
use crate::correlation::CorrelationId;
use crate::error::EventError;
use crate::event::WebhookRequest;
use crate::publisher::EventPublisher;
use crate::CORRELATION_HEADER;
use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::message::{Header, OwnedHeaders};
use rdkafka::producer::{FutureProducer, FutureRecord};
use std::time::Duration;
use tracing::{debug, info};

/// Kafka-backed event publisher.
///
/// `acks=all` so a returned `Ok` means the brokers durably accepted the
/// message. Dropping the publish future (client disconnect, shutdown)
/// abandons the attempt without leaking it.
pub struct KafkaPublisher {
    producer: FutureProducer,
    topic: String,
    message_timeout: Duration,
}

impl KafkaPublisher {
    /// Create a producer from the given bus configuration.
    pub fn new(config: &BusConfig) -> Result<Self, EventError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("client.id", &config.client_id)
            .set(
                "message.timeout.ms",
                config.message_timeout.as_millis().to_string(),
            )
            .set("acks", "all")
            .create()
            .map_err(|e| EventError::ProducerInit {
                brokers: config.brokers.clone(),
                cause: e.to_string(),
            })?;

        info!(
            brokers = %config.brokers,
            topic = %config.topic,
            client_id = %config.client_id,
            "Kafka publisher initialized"
        );

        Ok(Self {
            producer,
            topic: config.topic.clone(),
            message_timeout: config.message_timeout,
        })
    }
}

#[async_trait]
impl EventPublisher for KafkaPublisher {
    async fn publish(
        &self,
        event: &WebhookRequest,
        correlation_id: CorrelationId,
    ) -> Result<(), EventError> {
        let payload = serde_json::to_vec(event)?;
        let key = event.object_id.to_string();
        let correlation = correlation_id.to_string();

        let record = FutureRecord::to(&self.topic)
            .key(&key)
            .payload(&payload)
            .headers(OwnedHeaders::new().insert(Header {
                key: CORRELATION_HEADER,
                value: Some(correlation.as_bytes()),
            }));

        // Resolves only once the brokers ack (or the timeout fires).
        let (partition, offset) = self
            .producer
            .send(record, self.message_timeout)
            .await
            .map_err(|(err, _)| EventError::PublishFailed {
                topic: self.topic.clone(),
                cause: err.to_string(),
            })?;

        debug!(
            correlation_id = %correlation,
            object_id = event.object_id,
            partition,
            offset,
            "Event published"
        );

        Ok(())
    }
}
