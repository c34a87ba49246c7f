//! Edge gate library.
//!
//! Origin allowlist, per-client sliding-window rate limiting and a
//! delegated authentication gate, composed into one axum middleware.

pub mod config;
pub mod gate;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::GateConfig;
pub use gate::{Gatekeeper, Verdict};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
