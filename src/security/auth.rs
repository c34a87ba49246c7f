//! Authentication gate for protected routes.
//!
//! The gatekeeper hands protected requests to an [`AuthGate`] and returns
//! whatever response the gate produces without inspecting it. Providers own
//! their own denial semantics (redirect, 401, custom page).

use std::collections::HashSet;

use async_trait::async_trait;
use axum::{
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Json, Redirect, Response},
};
use serde_json::json;

use crate::config::{AuthConfig, AuthMode};

/// Result of an authorization attempt.
#[derive(Debug)]
pub enum AuthOutcome {
    /// Let the request through.
    Continue,
    /// Stop the pipeline and answer with this response.
    Terminate(Response),
}

/// Capability that decides whether a protected request may proceed.
#[async_trait]
pub trait AuthGate: Send + Sync {
    async fn authorize(&self, parts: &Parts) -> AuthOutcome;
}

/// Gate that admits everything.
#[derive(Debug, Clone, Default)]
pub struct AllowAll;

#[async_trait]
impl AuthGate for AllowAll {
    async fn authorize(&self, _parts: &Parts) -> AuthOutcome {
        AuthOutcome::Continue
    }
}

/// Gate that accepts a known session token from a bearer header or cookie.
#[derive(Debug, Clone)]
pub struct BearerTokenGate {
    tokens: HashSet<String>,
    session_cookie: String,
    sign_in_url: Option<String>,
}

impl BearerTokenGate {
    pub fn new(
        tokens: impl IntoIterator<Item = String>,
        session_cookie: impl Into<String>,
        sign_in_url: Option<String>,
    ) -> Self {
        Self {
            tokens: tokens.into_iter().collect(),
            session_cookie: session_cookie.into(),
            sign_in_url,
        }
    }

    fn presented_tokens<'a>(&self, parts: &'a Parts) -> Vec<&'a str> {
        let mut found = Vec::new();

        if let Some(token) = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
        {
            found.push(token.trim());
        }

        for cookies in parts.headers.get_all(header::COOKIE) {
            let Ok(cookies) = cookies.to_str() else {
                continue;
            };
            for pair in cookies.split(';') {
                if let Some((name, value)) = pair.trim().split_once('=') {
                    if name == self.session_cookie {
                        found.push(value);
                    }
                }
            }
        }

        found
    }

    fn deny(&self, parts: &Parts) -> Response {
        match &self.sign_in_url {
            Some(sign_in) => {
                let back_to = parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str())
                    .unwrap_or("/");
                let encoded: String =
                    url::form_urlencoded::byte_serialize(back_to.as_bytes()).collect();
                let separator = if sign_in.contains('?') { '&' } else { '?' };
                Redirect::temporary(&format!("{sign_in}{separator}redirect_url={encoded}"))
                    .into_response()
            }
            None => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Unauthorized" })),
            )
                .into_response(),
        }
    }
}

#[async_trait]
impl AuthGate for BearerTokenGate {
    async fn authorize(&self, parts: &Parts) -> AuthOutcome {
        let authorized = self
            .presented_tokens(parts)
            .into_iter()
            .any(|t| self.tokens.contains(t));

        if authorized {
            AuthOutcome::Continue
        } else {
            tracing::debug!(path = %parts.uri.path(), "No valid session presented");
            AuthOutcome::Terminate(self.deny(parts))
        }
    }
}

/// Build the gate selected by configuration.
pub fn from_config(config: &AuthConfig) -> std::sync::Arc<dyn AuthGate> {
    match config.mode {
        AuthMode::Disabled => std::sync::Arc::new(AllowAll),
        AuthMode::Bearer => std::sync::Arc::new(BearerTokenGate::new(
            config.tokens.iter().cloned(),
            config.session_cookie.clone(),
            config.sign_in_url.clone(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(builder: axum::http::request::Builder) -> Parts {
        builder.body(()).unwrap().into_parts().0
    }

    fn gate(sign_in_url: Option<&str>) -> BearerTokenGate {
        BearerTokenGate::new(
            vec!["s3cret".to_string()],
            "__session",
            sign_in_url.map(str::to_string),
        )
    }

    #[tokio::test]
    async fn test_bearer_header_accepted() {
        let req = parts(
            Request::builder()
                .uri("/dashboard")
                .header("Authorization", "Bearer s3cret"),
        );
        assert!(matches!(gate(None).authorize(&req).await, AuthOutcome::Continue));
    }

    #[tokio::test]
    async fn test_session_cookie_accepted() {
        let req = parts(
            Request::builder()
                .uri("/lessons/1")
                .header("Cookie", "theme=dark; __session=s3cret"),
        );
        assert!(matches!(gate(None).authorize(&req).await, AuthOutcome::Continue));
    }

    #[tokio::test]
    async fn test_unknown_token_gets_401() {
        let req = parts(
            Request::builder()
                .uri("/dashboard")
                .header("Authorization", "Bearer wrong"),
        );
        match gate(None).authorize(&req).await {
            AuthOutcome::Terminate(resp) => assert_eq!(resp.status(), StatusCode::UNAUTHORIZED),
            AuthOutcome::Continue => panic!("unknown token admitted"),
        }
    }

    #[tokio::test]
    async fn test_redirects_to_sign_in() {
        let req = parts(Request::builder().uri("/lessons/intro?step=2"));
        match gate(Some("https://auth.example.com/sign-in"))
            .authorize(&req)
            .await
        {
            AuthOutcome::Terminate(resp) => {
                assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
                assert_eq!(
                    resp.headers()[header::LOCATION],
                    "https://auth.example.com/sign-in?redirect_url=%2Flessons%2Fintro%3Fstep%3D2"
                );
            }
            AuthOutcome::Continue => panic!("anonymous request admitted"),
        }
    }

    #[tokio::test]
    async fn test_allow_all() {
        let req = parts(Request::builder().uri("/dashboard"));
        assert!(matches!(AllowAll.authorize(&req).await, AuthOutcome::Continue));
    }
}
