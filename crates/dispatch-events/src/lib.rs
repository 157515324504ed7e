//! # Dispatch Events - Webhook Event Types and Bus Publishing
//!
//! Domain types for inbound fitness-platform webhook deliveries and the
//! publishing port used to hand accepted events to the message bus.
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────┐                      ┌──────────────┐
//! │   Gateway    │    publish()         │  Message Bus │
//! │  (validated  │ ───────────────────→ │   (Kafka)    │
//! │   delivery)  │    + correlation_id  │              │
//! └──────────────┘                      └──────────────┘
//! ```
//!
//! The gateway depends only on the [`EventPublisher`] trait; the Kafka
//! adapter and the in-memory adapter are interchangeable behind it. One
//! publish attempt per inbound call: the upstream platform retries failed
//! deliveries on its own schedule, and downstream consumers dedupe on
//! `object_id` + `event_time`.

#![warn(clippy::all)]
#![deny(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod correlation;
pub mod error;
pub mod event;
pub mod kafka;
pub mod publisher;

// Re-export main types
pub use config::BusConfig;
pub use correlation::CorrelationId;
pub use error::EventError;
pub use event::{ValidationError, WebhookRequest};
pub use kafka::KafkaPublisher;
pub use publisher::{EventPublisher, InMemoryPublisher};

/// Transport header carrying the per-request correlation id.
///
/// Metadata only, never part of the payload body, so downstream consumers
/// can correlate without parsing the event.
pub const CORRELATION_HEADER: &str = "correlation_id";
