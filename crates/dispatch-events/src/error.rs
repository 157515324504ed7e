//! Error types for bus configuration and publishing.

/// Errors raised by the event bus layer.
///
/// Configuration variants are startup-fatal; publish variants surface to the
/// gateway, which converts them into a 500 so the upstream platform retries
/// the delivery.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// A required environment variable is absent.
    #[error("missing required configuration: {var}")]
    MissingConfig {
        /// Name of the missing variable.
        var: &'static str,
    },

    /// An environment variable is present but unusable.
    #[error("invalid configuration for {var}: {reason}")]
    InvalidConfig {
        /// Name of the offending variable.
        var: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The bus producer could not be constructed.
    #[error("failed to create bus producer for {brokers}: {cause}")]
    ProducerInit {
        /// Broker list the producer was pointed at.
        brokers: String,
        /// Underlying client error.
        cause: String,
    },

    /// The event could not be serialized to its wire form.
    #[error("failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The broker rejected or timed out the publish.
    #[error("failed to publish to {topic}: {cause}")]
    PublishFailed {
        /// Destination topic.
        topic: String,
        /// Broker-side or timeout error.
        cause: String,
    },
}
