//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! API request:
//!     → origin.rs (Origin header vs allowlist + own origin)
//!     → client_key.rs (derive per-client key)
//!     → rate_limit.rs (sliding-window check per key)
//! Protected request:
//!     → auth.rs (delegated authorization)
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any security check failure
//! - No trust in client input beyond best-effort partitioning

pub mod auth;
pub mod client_key;
pub mod origin;
pub mod rate_limit;

pub use auth::{AllowAll, AuthGate, AuthOutcome, BearerTokenGate};
pub use client_key::{ClientKeyExtractor, ClientKeyStrategy, UNKNOWN_CLIENT};
pub use origin::{request_origin, OriginPolicy};
pub use rate_limit::{RateDecision, SlidingWindowLimiter};
