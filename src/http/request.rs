//! Request identification.
//!
//! Every request gets an `x-request-id` (UUID v4) unless the caller already
//! sent one. The id is echoed on the response and forwarded upstream.

use axum::http::{HeaderName, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the request id.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates UUID v4 request ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Request id of `req`, or `"unknown"` before the id layer has run.
pub fn request_id<B>(req: &Request<B>) -> &str {
    req.headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generates_distinct_ids() {
        let req = Request::builder().body(()).unwrap();
        let mut make = UuidRequestId;
        let a = make.make_request_id(&req).unwrap();
        let b = make.make_request_id(&req).unwrap();
        assert_ne!(a.header_value(), b.header_value());
        assert!(Uuid::parse_str(a.header_value().to_str().unwrap()).is_ok());
    }

    #[test]
    fn test_request_id_lookup() {
        let req = Request::builder()
            .header("x-request-id", "abc")
            .body(())
            .unwrap();
        assert_eq!(request_id(&req), "abc");
        assert_eq!(request_id(&Request::builder().body(()).unwrap()), "unknown");
    }
}
