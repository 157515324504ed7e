//! Shared fixtures for the end-to-end gateway tests.
//!
//! A [`TestGateway`] wires the real router to a real [`SecretCache`]
//! backed by a temp-dir secrets file and an [`InMemoryPublisher`], then
//! drives requests through `tower::ServiceExt::oneshot` without a socket.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use tower::ServiceExt;

use dispatch_events::InMemoryPublisher;
use dispatch_gateway::{build_router, AppState, SecretCache};

/// Verify token written to the fixture secrets file.
pub const VERIFY_TOKEN: &str = "test-verify-token";

/// Subscription id written to the fixture secrets file.
pub const SUBSCRIPTION_ID: i64 = 120475;

/// A fully wired gateway over temp-file secrets and an in-memory bus.
pub struct TestGateway {
    app: Router,
    /// Publisher double, inspectable after requests.
    pub publisher: Arc<InMemoryPublisher>,
    secrets_dir: tempfile::TempDir,
}

impl TestGateway {
    /// Gateway with a long TTL: secrets are effectively read once.
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(300))
    }

    /// Gateway with a zero TTL re-reads the secrets file on every request,
    /// which is what rotation tests need.
    pub fn with_ttl(ttl: Duration) -> Self {
        let secrets_dir = tempfile::tempdir().unwrap();
        let path = secrets_dir.path().join("strava_auth.json");
        write_secrets_file(&path, VERIFY_TOKEN, serde_json::json!(SUBSCRIPTION_ID));

        let publisher = Arc::new(InMemoryPublisher::new());
        let state = AppState {
            secrets: Arc::new(SecretCache::new(path, ttl)),
            publisher: publisher.clone(),
        };

        Self {
            app: build_router(state),
            publisher,
            secrets_dir,
        }
    }

    pub fn secrets_path(&self) -> PathBuf {
        self.secrets_dir.path().join("strava_auth.json")
    }

    /// Replace the secrets file contents, simulating a platform rotation.
    pub fn rotate_secrets(&self, token: &str, subscription_id: serde_json::Value) {
        write_secrets_file(&self.secrets_path(), token, subscription_id);
    }

    /// Remove the secrets file, simulating a broken mount.
    pub fn delete_secrets(&self) {
        std::fs::remove_file(self.secrets_path()).unwrap();
    }

    pub async fn head(&self) -> Response {
        self.request("HEAD", "/", Body::empty()).await
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.request("GET", uri, Body::empty()).await
    }

    pub async fn post_json(&self, body: &serde_json::Value) -> Response {
        self.request("POST", "/", Body::from(serde_json::to_vec(body).unwrap()))
            .await
    }

    pub async fn post_raw(&self, body: &str) -> Response {
        self.request("POST", "/", Body::from(body.to_string())).await
    }

    pub async fn request(&self, method: &str, uri: &str, body: Body) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body)
            .unwrap();
        self.app.clone().oneshot(request).await.unwrap()
    }
}

impl Default for TestGateway {
    fn default() -> Self {
        Self::new()
    }
}

/// A handshake URI for the fixture token.
pub fn handshake_uri(mode: &str, challenge: &str, token: &str) -> String {
    format!("/?hub.mode={mode}&hub.challenge={challenge}&hub.verify_token={token}")
}

/// A well-formed activity-create event matching the fixture subscription.
pub fn valid_event() -> serde_json::Value {
    serde_json::json!({
        "aspect_type": "create",
        "object_type": "activity",
        "object_id": 9_876_543_210i64,
        "owner_id": 134_815,
        "event_time": 1_549_560_669,
        "subscription_id": SUBSCRIPTION_ID,
    })
}

/// Drain a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn write_secrets_file(path: &Path, token: &str, subscription_id: serde_json::Value) {
    let body = serde_json::json!({
        "webhook_verify_token": token,
        "webhook_subscription_id": subscription_id,
    });
    std::fs::write(path, serde_json::to_vec(&body).unwrap()).unwrap();
}
