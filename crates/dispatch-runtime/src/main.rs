//! # Dispatch Runtime
//!
//! The main entry point for the webhook dispatch service.
//!
//! ## Request Flow
//!
//! ```text
//!   Platform webhook ──HTTP──→ dispatch-gateway
//!                                    │
//!                      decode → validate → authenticate
//!                                    │
//!                                    ↓
//!                            EventPublisher port
//!                                    │
//!                                    ↓
//!                             KafkaPublisher ──→ message bus
//! ```
//!
//! ## Startup Sequence
//!
//! 1. Load gateway configuration from the environment
//! 2. Initialize the tracing subscriber (`LOG_LEVEL`, `LOG_FORMAT`)
//! 3. Load message bus configuration and build the Kafka producer
//! 4. Start the HTTP gateway and serve until Ctrl-C

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use dispatch_events::{BusConfig, KafkaPublisher};
use dispatch_gateway::{GatewayConfig, GatewayService};

#[tokio::main]
async fn main() -> Result<()> {
    let config = GatewayConfig::from_env().context("Failed to load gateway configuration")?;

    init_tracing(&config.log_level);

    info!(version = dispatch_gateway::VERSION, "Starting webhook dispatch service");

    let bus_config = BusConfig::from_env().context("Failed to load message bus configuration")?;
    let publisher =
        KafkaPublisher::new(&bus_config).context("Failed to initialize Kafka publisher")?;

    let (service, shutdown) = GatewayService::new(config, Arc::new(publisher));

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl-C received, shutting down");
                shutdown.shutdown();
            }
            Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
        }
    });

    service.start().await.context("Gateway terminated with an error")?;

    info!("Webhook dispatch service stopped");
    Ok(())
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `LOG_LEVEL` when set; `LOG_FORMAT=json`
/// switches to newline-delimited JSON output for log aggregation.
fn init_tracing(log_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
