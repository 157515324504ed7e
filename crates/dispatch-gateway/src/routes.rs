//! The webhook HTTP surface: one path, dispatched by method.
//!
//! Request outcomes, not a persistent state machine: every request is
//! independent. Within one POST the order is fixed: decode → validate →
//! authenticate → publish; an invalid or unauthenticated event never
//! reaches the publisher.

use crate::middleware::CorrelationLayer;
use crate::secrets::SecretCache;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::head;
use axum::{Extension, Json, Router};
use dispatch_events::{CorrelationId, EventPublisher, WebhookRequest};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{info, warn};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Rotatable platform credentials.
    pub secrets: Arc<SecretCache>,
    /// Destination for accepted activity events.
    pub publisher: Arc<dyn EventPublisher>,
}

/// Build the gateway router: a single endpoint handling all methods.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            head(liveness)
                .get(handshake)
                .post(deliver)
                .fallback(method_not_allowed),
        )
        .layer(CorrelationLayer::new())
        .with_state(state)
}

/// Subscription handshake query parameters.
#[derive(Debug, Deserialize)]
struct HandshakeParams {
    #[serde(rename = "hub.mode", default)]
    mode: String,
    #[serde(rename = "hub.challenge", default)]
    challenge: String,
    #[serde(rename = "hub.verify_token", default)]
    verify_token: String,
}

#[derive(Serialize)]
struct SuccessBody {
    success: &'static str,
    correlation_id: CorrelationId,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    correlation_id: CorrelationId,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

fn error_response(
    status: StatusCode,
    correlation_id: CorrelationId,
    message: impl Into<String>,
    details: Option<String>,
) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
            correlation_id,
            details,
        }),
    )
        .into_response()
}

fn success_response(correlation_id: CorrelationId) -> Response {
    (
        StatusCode::CREATED,
        Json(SuccessBody {
            success: "true",
            correlation_id,
        }),
    )
        .into_response()
}

/// `HEAD /`: liveness probe.
async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// Any other method: 405 with the standard error body.
async fn method_not_allowed(Extension(correlation_id): Extension<CorrelationId>) -> Response {
    warn!("Invalid request method");
    error_response(
        StatusCode::METHOD_NOT_ALLOWED,
        correlation_id,
        "Method not allowed",
        None,
    )
}

/// `GET /`: the platform's subscription handshake.
///
/// The success body echoes `hub.challenge` verbatim under the exact key
/// `"hub.challenge"`; the platform requires that shape to activate the
/// subscription.
async fn handshake(
    State(state): State<AppState>,
    Extension(correlation_id): Extension<CorrelationId>,
    uri: Uri,
) -> Response {
    info!("Processing webhook verification request");

    let params = match Query::<HandshakeParams>::try_from_uri(&uri) {
        Ok(Query(params)) => params,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                correlation_id,
                "Invalid query string",
                Some(e.to_string()),
            )
        }
    };

    if params.mode != "subscribe" {
        let msg = format!("invalid hub.mode: {}", params.mode);
        warn!("{msg}");
        return error_response(StatusCode::BAD_REQUEST, correlation_id, msg, None);
    }

    let (verify_token, _) = match state.secrets.get_secrets() {
        Ok(pair) => pair,
        Err(e) => {
            warn!(error = %e, "Secrets unavailable during handshake");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                correlation_id,
                "Failed to load webhook secrets",
                Some(e.to_string()),
            );
        }
    };

    if !constant_time_eq(params.verify_token.as_bytes(), verify_token.as_bytes()) {
        warn!("Invalid verify token");
        return error_response(
            StatusCode::UNAUTHORIZED,
            correlation_id,
            "Invalid verify token",
            None,
        );
    }

    info!("Webhook verification successful");
    (
        StatusCode::OK,
        Json(serde_json::json!({ "hub.challenge": params.challenge })),
    )
        .into_response()
}

/// `POST /`: an event delivery.
async fn deliver(
    State(state): State<AppState>,
    Extension(correlation_id): Extension<CorrelationId>,
    body: Bytes,
) -> Response {
    info!("Processing webhook event");

    let webhook: WebhookRequest = match serde_json::from_slice(&body) {
        Ok(webhook) => webhook,
        Err(e) => {
            warn!(error = %e, "Invalid JSON payload");
            return error_response(
                StatusCode::BAD_REQUEST,
                correlation_id,
                "Invalid JSON payload",
                Some(e.to_string()),
            );
        }
    };

    if let Err(e) = webhook.validate() {
        warn!(error = %e, "Webhook validation failed");
        return error_response(
            StatusCode::BAD_REQUEST,
            correlation_id,
            "Webhook validation failed",
            Some(e.to_string()),
        );
    }

    let (_, subscription_id) = match state.secrets.get_secrets() {
        Ok(pair) => pair,
        Err(e) => {
            warn!(error = %e, "Secrets unavailable during delivery");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                correlation_id,
                "Failed to load webhook secrets",
                Some(e.to_string()),
            );
        }
    };

    // Sole perimeter control: possession of the subscription id.
    if webhook.subscription_id != subscription_id {
        let msg = format!("invalid subscription_id: {}", webhook.subscription_id);
        warn!("{msg}");
        return error_response(StatusCode::UNAUTHORIZED, correlation_id, msg, None);
    }

    if !webhook.is_activity() {
        info!(object_type = %webhook.object_type, "Ignoring non-activity webhook");
        return success_response(correlation_id);
    }

    if let Err(e) = state.publisher.publish(&webhook, correlation_id).await {
        warn!(error = %e, "Failed to publish webhook");
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            correlation_id,
            "Failed to publish event",
            Some(e.to_string()),
        );
    }

    info!(object_id = webhook.object_id, "Webhook processing successful");
    success_response(correlation_id)
}

/// Constant-time token equality; unequal lengths compare unequal without
/// an early-exit timing signal on the shared prefix.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
