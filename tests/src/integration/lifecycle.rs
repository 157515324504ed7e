//! # Liveness, Method Dispatch, and Secret Rotation
//!
//! The non-POST surface of the endpoint, plus full-stack rotation
//! sequences against the secret cache over a real file.

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::support::{body_json, handshake_uri, TestGateway, VERIFY_TOKEN};
    use std::time::Duration;

    #[tokio::test]
    async fn test_head_is_liveness() {
        let gateway = TestGateway::new();

        let response = gateway.head().await;

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), 1024)
            .await
            .unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_head_works_without_secrets() {
        // Liveness must not depend on the secrets mount.
        let gateway = TestGateway::new();
        gateway.delete_secrets();

        let response = gateway.head().await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_other_methods_are_rejected() {
        let gateway = TestGateway::new();

        for method in ["DELETE", "PUT", "PATCH"] {
            let response = gateway
                .request(method, "/", axum::body::Body::empty())
                .await;
            assert_eq!(
                response.status(),
                StatusCode::METHOD_NOT_ALLOWED,
                "method {method}"
            );
            let body = body_json(response).await;
            assert_eq!(body["error"], "Method not allowed");
            assert!(body["correlation_id"].is_string());
        }
    }

    #[tokio::test]
    async fn test_each_request_gets_a_distinct_correlation_id() {
        let gateway = TestGateway::new();

        let first = body_json(gateway.request("DELETE", "/", axum::body::Body::empty()).await).await;
        let second = body_json(gateway.request("DELETE", "/", axum::body::Body::empty()).await).await;

        assert_ne!(first["correlation_id"], second["correlation_id"]);
    }

    #[tokio::test]
    async fn test_rotated_token_takes_effect() {
        let gateway = TestGateway::with_ttl(Duration::ZERO);

        let response = gateway
            .get(&handshake_uri("subscribe", "chal", VERIFY_TOKEN))
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        gateway.rotate_secrets("rotated-token", serde_json::json!(1));

        let stale = gateway
            .get(&handshake_uri("subscribe", "chal", VERIFY_TOKEN))
            .await;
        assert_eq!(stale.status(), StatusCode::UNAUTHORIZED);

        let fresh = gateway
            .get(&handshake_uri("subscribe", "chal", "rotated-token"))
            .await;
        assert_eq!(fresh.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_deleted_file_serves_stale_secrets() {
        let gateway = TestGateway::with_ttl(Duration::ZERO);

        let warm = gateway
            .get(&handshake_uri("subscribe", "chal", VERIFY_TOKEN))
            .await;
        assert_eq!(warm.status(), StatusCode::OK);

        gateway.delete_secrets();

        let stale = gateway
            .get(&handshake_uri("subscribe", "chal", VERIFY_TOKEN))
            .await;
        assert_eq!(stale.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_restored_file_is_picked_up_after_outage() {
        let gateway = TestGateway::with_ttl(Duration::ZERO);

        let warm = gateway
            .get(&handshake_uri("subscribe", "chal", VERIFY_TOKEN))
            .await;
        assert_eq!(warm.status(), StatusCode::OK);

        gateway.delete_secrets();
        let _ = gateway
            .get(&handshake_uri("subscribe", "chal", VERIFY_TOKEN))
            .await;

        // Stale serving must not reset the refresh clock: the restored
        // file is honored on the very next request.
        gateway.rotate_secrets("after-outage", serde_json::json!(1));

        let fresh = gateway
            .get(&handshake_uri("subscribe", "chal", "after-outage"))
            .await;
        assert_eq!(fresh.status(), StatusCode::OK);
    }
}
