//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Gate and forwarder produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through logs and upstream headers
//! - Metrics are cheap (atomic increments), no-ops when disabled

pub mod logging;
pub mod metrics;
