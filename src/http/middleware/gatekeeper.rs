//! Gatekeeper middleware.
//! Runs the gate pipeline in front of every request.
//!
//! ```ignore
//! let gate = Arc::new(Gatekeeper::from_config(&config));
//! let app = Router::new()
//!     .route("/api/chat", post(chat))
//!     .layer(axum::middleware::from_fn_with_state(gate, gatekeeper_middleware));
//! ```

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::gate::{Gatekeeper, Verdict};

pub async fn gatekeeper_middleware(
    State(gate): State<Arc<Gatekeeper>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let (parts, body) = req.into_parts();

    match gate.evaluate(&parts).await {
        Verdict::Pass => next.run(Request::from_parts(parts, body)).await,
        Verdict::Reject(rejection) => rejection.into_response(),
        Verdict::Terminate(response) => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AuthMode, GateConfig};
    use axum::{http::StatusCode, routing::any, Router};
    use tower::ServiceExt;

    fn app(config: &GateConfig) -> Router {
        let gate = Arc::new(Gatekeeper::from_config(config));
        Router::new()
            .route("/", any(|| async { "home" }))
            .route("/{*path}", any(|| async { "inner" }))
            .layer(axum::middleware::from_fn_with_state(gate, gatekeeper_middleware))
    }

    fn get(path: &str) -> axum::http::request::Builder {
        Request::builder()
            .uri(path)
            .header("Host", "learn.example.com")
            .header("X-Forwarded-For", "203.0.113.1")
    }

    #[tokio::test]
    async fn test_pass_through_reaches_handler() {
        let response = app(&GateConfig::default())
            .oneshot(
                get("/api/chat")
                    .header("Origin", "http://learn.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 64).await.unwrap();
        assert_eq!(&body[..], b"inner");
    }

    #[tokio::test]
    async fn test_foreign_origin_gets_403_json() {
        let response = app(&GateConfig::default())
            .oneshot(
                get("/api/chat")
                    .header("Origin", "https://evil.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = axum::body::to_bytes(response.into_body(), 256).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Forbidden: unknown origin");
    }

    #[tokio::test]
    async fn test_protected_route_uses_configured_gate() {
        let mut config = GateConfig::default();
        config.auth.mode = AuthMode::Bearer;
        config.auth.tokens = vec!["learner-token".into()];
        config.auth.sign_in_url = Some("/sign-in".into());
        let app = app(&config);

        let denied = app
            .clone()
            .oneshot(get("/lessons/1").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(denied.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            denied.headers()["location"],
            "/sign-in?redirect_url=%2Flessons%2F1"
        );

        let allowed = app
            .oneshot(
                get("/lessons/1")
                    .header("Cookie", "__session=learner-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(allowed.status(), StatusCode::OK);
    }
}
