//! Gateway service lifecycle: bind, serve, graceful shutdown.

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::routes::{build_router, AppState};
use crate::secrets::SecretCache;
use dispatch_events::EventPublisher;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::info;

/// Handle that triggers graceful shutdown of a running [`GatewayService`].
pub struct ShutdownHandle(oneshot::Sender<()>);

impl ShutdownHandle {
    /// Stop accepting connections and let in-flight requests finish.
    pub fn shutdown(self) {
        let _ = self.0.send(());
    }
}

/// The webhook gateway HTTP service.
pub struct GatewayService {
    config: GatewayConfig,
    state: AppState,
    shutdown_rx: oneshot::Receiver<()>,
}

impl GatewayService {
    /// Assemble the service from configuration and a publisher.
    ///
    /// The secret cache is constructed here, seeded from any env-provided
    /// credentials, and injected into the handlers; no global state.
    pub fn new(
        config: GatewayConfig,
        publisher: Arc<dyn EventPublisher>,
    ) -> (Self, ShutdownHandle) {
        let secrets = Arc::new(SecretCache::with_seed(
            config.secrets_path.clone(),
            config.secret_cache_ttl,
            config.seed_secrets(),
        ));

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        (
            Self {
                config,
                state: AppState { secrets, publisher },
                shutdown_rx,
            },
            ShutdownHandle(shutdown_tx),
        )
    }

    /// Bind the listener and serve until shutdown is triggered.
    pub async fn start(self) -> Result<(), GatewayError> {
        let addr = self.config.addr();
        let router = build_router(self.state);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(e.to_string()))?;

        info!(addr = %addr, "Starting webhook gateway");

        let shutdown_rx = self.shutdown_rx;
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
                info!("Received shutdown signal");
            })
            .await
            .map_err(|e| GatewayError::Internal(e.to_string()))?;

        info!("Webhook gateway stopped");
        Ok(())
    }
}
