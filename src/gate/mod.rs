//! Edge gatekeeper.
//!
//! # Data Flow
//! ```text
//! request parts
//!     → classify path (routing)
//!     → API?        origin check → rate check   (403 / 429)
//!     → protected?  auth gate                   (provider's response)
//!     → Verdict::Pass
//! ```
//!
//! # Design Decisions
//! - Stage order origin → rate → auth, first objection wins
//! - Limiter is injected, never a global
//! - Policy is swappable at runtime; limiter state is not

pub mod pipeline;
pub mod rejection;

pub use pipeline::{GatePolicy, Gatekeeper, Verdict};
pub use rejection::GateRejection;
