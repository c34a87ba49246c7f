//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) + ALLOWED_ORIGINS env
//!     → loader.rs (parse, merge env)
//!     → validation.rs (semantic checks)
//!     → GateConfig (validated, immutable)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → gate policy swapped atomically
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_or_default, ConfigError, ALLOWED_ORIGINS_ENV};
pub use schema::{
    AuthConfig, AuthMode, GateConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    OriginsConfig, RateLimitConfig, RoutesConfig, UpstreamConfig,
};
pub use validation::ValidationError;
