//! Terminal rejections produced by the gate itself.

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

/// Why the gate refused an API request.
///
/// The display text is the exact `error` string sent to the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateRejection {
    #[error("Forbidden: unknown origin")]
    OriginRejected,

    /// `retry_after` is only populated when `Retry-After` emission is enabled.
    #[error("Too many requests, please slow down.")]
    RateLimitExceeded { retry_after: Option<Duration> },
}

impl GateRejection {
    pub fn status(&self) -> StatusCode {
        match self {
            GateRejection::OriginRejected => StatusCode::FORBIDDEN,
            GateRejection::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    /// Metric and log label.
    pub fn reason(&self) -> &'static str {
        match self {
            GateRejection::OriginRejected => "origin",
            GateRejection::RateLimitExceeded { .. } => "rate_limit",
        }
    }
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        let mut response =
            (self.status(), Json(json!({ "error": self.to_string() }))).into_response();

        if let GateRejection::RateLimitExceeded {
            retry_after: Some(wait),
        } = self
        {
            // Whole seconds, rounded up, never zero.
            let secs = wait.as_millis().div_ceil(1000).max(1);
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}
