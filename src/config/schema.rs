//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gate.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the edge gate.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GateConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream application that receives passed requests.
    pub upstream: UpstreamConfig,

    /// Route classification rules.
    pub routes: RoutesConfig,

    /// Externally allowed origins for API routes.
    pub origins: OriginsConfig,

    /// Sliding-window rate limiting.
    pub rate_limit: RateLimitConfig,

    /// Authentication gate for protected routes.
    pub auth: AuthConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream address (e.g., "127.0.0.1:3000").
    pub address: String,

    /// Request timeout (total time for request/response) in seconds.
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:3000".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Path rules used to classify requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Prefix identifying API routes (origin and rate checks).
    pub api_prefix: String,

    /// Prefixes identifying routes that require authentication.
    pub protected_prefixes: Vec<String>,

    /// Skip the gate for framework internals and static assets.
    pub static_bypass: bool,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            api_prefix: "/api".to_string(),
            protected_prefixes: vec!["/dashboard".to_string(), "/lessons".to_string()],
            static_bypass: true,
        }
    }
}

/// Origins allowed to call API routes in addition to same-origin callers.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct OriginsConfig {
    /// Exact origin strings, e.g. "https://admin.example.com".
    pub allowed: Vec<String>,
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Lookback window in milliseconds.
    pub window_ms: u64,

    /// Maximum requests per client key inside one window.
    pub max_requests: usize,

    /// Consult `X-Real-IP` after `X-Forwarded-For` when deriving client keys.
    pub trust_real_ip: bool,

    /// Add a `Retry-After` header to 429 responses.
    pub emit_retry_after: bool,

    /// Interval for sweeping fully-stale client keys. Disabled when unset.
    pub sweep_interval_secs: Option<u64>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_ms: 60_000,
            max_requests: 30,
            trust_real_ip: false,
            emit_retry_after: false,
            sweep_interval_secs: None,
        }
    }
}

/// Which authentication gate protects protected routes.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Every request is let through.
    #[default]
    Disabled,
    /// Bearer token or session cookie must match a configured token.
    Bearer,
}

/// Authentication gate configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    pub mode: AuthMode,

    /// Accepted session tokens.
    pub tokens: Vec<String>,

    /// Cookie carrying the session token.
    pub session_cookie: String,

    /// Where unauthenticated page requests are redirected. Without it the
    /// gate answers 401.
    pub sign_in_url: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: AuthMode::Disabled,
            tokens: Vec::new(),
            session_cookie: "__session".to_string(),
            sign_in_url: None,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
