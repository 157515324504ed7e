//! # Dispatch Gateway - Webhook Ingestion HTTP Surface
//!
//! Receives inbound webhook calls from the fitness platform, performs the
//! subscription handshake, authenticates event deliveries against a
//! rotating shared secret, validates payloads, and hands accepted activity
//! events to the event publisher.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      WEBHOOK GATEWAY                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  inbound HTTP ──→ CorrelationLayer (id + span)              │
//! │                        │                                    │
//! │        ┌───────────────┼───────────────┐                    │
//! │        ▼               ▼               ▼                    │
//! │      HEAD             GET             POST                  │
//! │    liveness        handshake    decode → validate →         │
//! │                        │        authenticate → publish      │
//! │                        │               │                    │
//! │                  ┌─────┴─────┐         │                    │
//! │                  │SecretCache│◄────────┘                    │
//! │                  │ (TTL +    │                              │
//! │                  │  content  │         ▼                    │
//! │                  │  hash)    │   EventPublisher             │
//! │                  └─────┬─────┘         │                    │
//! └────────────────────────┼───────────────┼────────────────────┘
//!                          │               │
//!                   mounted secrets    message bus
//! ```
//!
//! # Security
//!
//! The subscription-id comparison on POST deliveries is the *sole*
//! perimeter control: the endpoint is publicly reachable (it has to be,
//! for the platform to deliver) and there is no per-message signature.
//! The handshake token compare is constant-time.

#![warn(clippy::all)]
#![deny(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod secrets;
pub mod service;

// Re-exports for public API
pub use config::{ConfigError, GatewayConfig};
pub use error::GatewayError;
pub use middleware::CorrelationLayer;
pub use routes::{build_router, AppState};
pub use secrets::{SecretCache, SecretError, StravaSecrets};
pub use service::{GatewayService, ShutdownHandle};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
