//! Origin allowlist for API routes.
//!
//! The allowlist is the configured external origins plus the request's own
//! origin, so same-origin browser calls always pass. A request without an
//! `Origin` header is refused: non-browser clients that strip it get no
//! exemption.

use axum::http::{header, request::Parts};
use url::{Origin, Url};

/// Configured external origins.
#[derive(Debug, Clone, Default)]
pub struct OriginPolicy {
    allowed: Vec<String>,
}

impl OriginPolicy {
    pub fn new(allowed: Vec<String>) -> Self {
        Self { allowed }
    }

    /// Decide whether `origin_header` may call API routes.
    ///
    /// Exact string comparison against `own_origin` and the configured list.
    pub fn is_allowed(&self, origin_header: Option<&str>, own_origin: Option<&str>) -> bool {
        let Some(origin) = origin_header else {
            return false;
        };
        own_origin == Some(origin) || self.allowed.iter().any(|o| o == origin)
    }

    /// Check a request's `Origin` header against this policy.
    pub fn check_request(&self, parts: &Parts) -> bool {
        let own = request_origin(parts);
        let origin = parts
            .headers
            .get(header::ORIGIN)
            .and_then(|v| v.to_str().ok());
        self.is_allowed(origin, own.as_deref())
    }
}

/// Infer the origin (scheme + host) the request was addressed to.
///
/// Scheme comes from `X-Forwarded-Proto`, then the request URI, then
/// defaults to `http`. Host comes from the `Host` header, then the URI
/// authority. The result is serialized the way browsers serialize the
/// `Origin` header: lowercase host, default port dropped.
pub fn request_origin(parts: &Parts) -> Option<String> {
    let host = parts
        .headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .or_else(|| parts.uri.authority().map(|a| a.as_str().to_string()))?;

    let scheme = parts
        .headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_ascii_lowercase)
        .or_else(|| parts.uri.scheme_str().map(str::to_string))
        .unwrap_or_else(|| "http".to_string());

    let url = Url::parse(&format!("{}://{}", scheme, host)).ok()?;
    match url.origin() {
        origin @ Origin::Tuple(..) => Some(origin.ascii_serialization()),
        Origin::Opaque(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn request(host: Option<&str>, origin: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/chat");
        if let Some(host) = host {
            builder = builder.header("Host", host);
        }
        if let Some(origin) = origin {
            builder = builder.header("Origin", origin);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_request_origin_sources() {
        assert_eq!(
            request_origin(&request(Some("learn.example.com"), None)).as_deref(),
            Some("http://learn.example.com")
        );

        let forwarded = Request::builder()
            .uri("/api")
            .header("Host", "learn.example.com")
            .header("X-Forwarded-Proto", "https, http")
            .body(())
            .unwrap()
            .into_parts()
            .0;
        assert_eq!(
            request_origin(&forwarded).as_deref(),
            Some("https://learn.example.com")
        );

        let absolute = Request::builder()
            .uri("https://learn.example.com:8443/api")
            .body(())
            .unwrap()
            .into_parts()
            .0;
        assert_eq!(
            request_origin(&absolute).as_deref(),
            Some("https://learn.example.com:8443")
        );

        assert_eq!(request_origin(&request(None, None)), None);
    }

    #[test]
    fn test_request_origin_is_normalized() {
        assert_eq!(
            request_origin(&request(Some("Learn.Example.COM"), None)).as_deref(),
            Some("http://learn.example.com")
        );
        assert_eq!(
            request_origin(&request(Some("learn.example.com:80"), None)).as_deref(),
            Some("http://learn.example.com")
        );
        assert_eq!(
            request_origin(&request(Some("learn.example.com:8080"), None)).as_deref(),
            Some("http://learn.example.com:8080")
        );

        let behind_tls = Request::builder()
            .uri("/api")
            .header("Host", "learn.example.com:443")
            .header("X-Forwarded-Proto", "https")
            .body(())
            .unwrap()
            .into_parts()
            .0;
        assert_eq!(
            request_origin(&behind_tls).as_deref(),
            Some("https://learn.example.com")
        );

        // Unusable host or scheme yields no own origin.
        assert_eq!(request_origin(&request(Some("bad host"), None)), None);
    }

    #[test]
    fn test_same_origin_with_default_port_or_mixed_case_host() {
        let policy = OriginPolicy::default();
        let origin = Some("http://learn.example.com");
        assert!(policy.check_request(&request(Some("learn.example.com:80"), origin)));
        assert!(policy.check_request(&request(Some("Learn.Example.com"), origin)));
        assert!(!policy.check_request(&request(Some("learn.example.com:8080"), origin)));
    }

    #[test]
    fn test_same_origin_always_allowed() {
        let policy = OriginPolicy::default();
        let req = request(Some("learn.example.com"), Some("http://learn.example.com"));
        assert!(policy.check_request(&req));

        let restrictive = OriginPolicy::new(vec!["https://admin.example.com".into()]);
        assert!(restrictive.check_request(&req));
    }

    #[test]
    fn test_missing_origin_rejected() {
        let policy = OriginPolicy::default();
        assert!(!policy.check_request(&request(Some("learn.example.com"), None)));
        assert!(!policy.is_allowed(None, Some("http://learn.example.com")));
    }

    #[test]
    fn test_configured_and_foreign_origins() {
        let policy = OriginPolicy::new(vec!["https://admin.example.com".into()]);
        let own = Some("http://learn.example.com");

        assert!(policy.is_allowed(Some("https://admin.example.com"), own));
        assert!(!policy.is_allowed(Some("https://evil.example.com"), own));
        // Exact comparison: no trailing slash or case folding.
        assert!(!policy.is_allowed(Some("https://admin.example.com/"), own));
        assert!(!policy.is_allowed(Some("HTTPS://ADMIN.EXAMPLE.COM"), own));
    }

    #[test]
    fn test_decision_is_repeatable() {
        let policy = OriginPolicy::new(vec!["https://admin.example.com".into()]);
        let first = policy.is_allowed(Some("https://other.example.com"), None);
        for _ in 0..10 {
            assert_eq!(
                policy.is_allowed(Some("https://other.example.com"), None),
                first
            );
        }
    }
}
