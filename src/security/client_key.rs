//! Client key extraction for rate limiting.
//!
//! Best-effort reconstruction of the caller's address. Shared NATs collapse
//! many clients onto one key and forwarding headers are client-controlled
//! unless a trusted proxy overwrites them, so this is a partitioning
//! heuristic and not an identity.

use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::request::Parts;

/// Key used when no strategy yields a value.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// One source of client identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientKeyStrategy {
    /// First entry of `X-Forwarded-For`.
    ForwardedFor,
    /// `X-Real-IP`.
    RealIp,
    /// Peer address of the TCP connection.
    PeerAddr,
}

impl ClientKeyStrategy {
    fn extract(&self, parts: &Parts) -> Option<String> {
        match self {
            ClientKeyStrategy::ForwardedFor => header_value(parts, "x-forwarded-for")
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string),
            ClientKeyStrategy::RealIp => header_value(parts, "x-real-ip")
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string),
            ClientKeyStrategy::PeerAddr => parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string()),
        }
    }
}

fn header_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name).and_then(|v| v.to_str().ok())
}

/// Ordered list of strategies; the first non-empty result wins.
#[derive(Debug, Clone)]
pub struct ClientKeyExtractor {
    strategies: Vec<ClientKeyStrategy>,
}

impl ClientKeyExtractor {
    pub fn new(strategies: Vec<ClientKeyStrategy>) -> Self {
        Self { strategies }
    }

    /// Default chain, optionally consulting `X-Real-IP` before the peer address.
    pub fn with_real_ip(trust_real_ip: bool) -> Self {
        let mut strategies = vec![ClientKeyStrategy::ForwardedFor];
        if trust_real_ip {
            strategies.push(ClientKeyStrategy::RealIp);
        }
        strategies.push(ClientKeyStrategy::PeerAddr);
        Self::new(strategies)
    }

    pub fn extract(&self, parts: &Parts) -> String {
        self.strategies
            .iter()
            .find_map(|s| s.extract(parts))
            .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
    }
}

impl Default for ClientKeyExtractor {
    fn default() -> Self {
        Self::with_real_ip(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn with_peer(mut parts: Parts, peer: &str) -> Parts {
        let addr: SocketAddr = peer.parse().unwrap();
        parts.extensions.insert(ConnectInfo(addr));
        parts
    }

    #[test]
    fn test_forwarded_for_first_entry_wins() {
        let req = Request::builder()
            .header("X-Forwarded-For", " 203.0.113.7 , 10.0.0.1")
            .body(())
            .unwrap()
            .into_parts()
            .0;
        let req = with_peer(req, "10.0.0.2:5000");
        assert_eq!(ClientKeyExtractor::default().extract(&req), "203.0.113.7");
    }

    #[test]
    fn test_empty_forwarded_for_falls_through() {
        let req = Request::builder()
            .header("X-Forwarded-For", " , 10.0.0.1")
            .body(())
            .unwrap()
            .into_parts()
            .0;
        let req = with_peer(req, "198.51.100.4:443");
        assert_eq!(ClientKeyExtractor::default().extract(&req), "198.51.100.4");
    }

    #[test]
    fn test_real_ip_only_when_trusted() {
        let req = Request::builder()
            .header("X-Real-IP", "192.0.2.9")
            .body(())
            .unwrap()
            .into_parts()
            .0;
        let req = with_peer(req, "10.0.0.2:5000");

        assert_eq!(ClientKeyExtractor::default().extract(&req), "10.0.0.2");
        assert_eq!(ClientKeyExtractor::with_real_ip(true).extract(&req), "192.0.2.9");
    }

    #[test]
    fn test_sentinel_when_nothing_known() {
        let req = Request::builder().body(()).unwrap().into_parts().0;
        assert_eq!(ClientKeyExtractor::default().extract(&req), UNKNOWN_CLIENT);
    }
}
