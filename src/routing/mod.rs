//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → classifier.rs (route class lookup)
//!     → matcher.rs (evaluate path conditions)
//!     → Return: Api | Protected | Static | Public
//!
//! Rule Compilation (at startup and on reload):
//!     RoutesConfig
//!     → Compile prefix matchers
//!     → Freeze as immutable RouteClassifier
//! ```
//!
//! # Design Decisions
//! - Rules compiled once, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same path always yields the same class

pub mod classifier;
pub mod matcher;

pub use classifier::{RouteClass, RouteClassifier};
