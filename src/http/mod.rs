//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID)
//!     → middleware/gatekeeper.rs (pass or reject)
//!     → server.rs forward_handler (upstream call)
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::HttpServer;
