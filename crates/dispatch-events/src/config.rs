//! Message bus configuration from environment variables.
//!
//! Absence of required messaging configuration is a startup-time fatal
//! error, never a per-request one.

use crate::error::EventError;
use std::env;
use std::time::Duration;

/// Bus connection and topic configuration.
#[derive(Debug, Clone)]
pub struct BusConfig {
    /// Comma-separated list of broker addresses.
    pub brokers: String,
    /// Topic accepted activity events are published to.
    pub topic: String,
    /// Client identifier reported to the brokers.
    pub client_id: String,
    /// Upper bound on a single publish attempt, broker ack included.
    ///
    /// Must stay below the upstream platform's webhook timeout, or the
    /// platform would treat a slow-but-successful delivery as failed.
    pub message_timeout: Duration,
}

impl BusConfig {
    /// Load configuration from the environment.
    ///
    /// `KAFKA_BROKERS` and `WEBHOOK_EVENTS_TOPIC` are required;
    /// `KAFKA_CLIENT_ID` defaults to `dispatch-gateway`.
    pub fn from_env() -> Result<Self, EventError> {
        let brokers = require_env("KAFKA_BROKERS")?;
        let topic = require_env("WEBHOOK_EVENTS_TOPIC")?;
        let client_id =
            env::var("KAFKA_CLIENT_ID").unwrap_or_else(|_| "dispatch-gateway".to_string());

        Ok(Self {
            brokers,
            topic,
            client_id,
            message_timeout: Duration::from_secs(5),
        })
    }
}

fn require_env(var: &'static str) -> Result<String, EventError> {
    match env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(EventError::MissingConfig { var }),
    }
}
