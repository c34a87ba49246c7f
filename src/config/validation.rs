//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (window > 0, ceiling > 0)
//! - Check that configured origins are bare scheme+host values
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GateConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::{AuthMode, GateConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("origins.allowed: {value:?} is not a scheme+host origin")]
    InvalidOrigin { value: String },

    #[error("routes.{field}: prefix {value:?} must start with '/'")]
    InvalidPrefix { field: &'static str, value: String },

    #[error("rate_limit.{field} must be greater than zero")]
    ZeroLimit { field: &'static str },

    #[error("auth.tokens must not be empty when auth.mode = \"bearer\"")]
    MissingTokens,
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    check_address(&mut errors, "upstream.address", &config.upstream.address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    for origin in &config.origins.allowed {
        if !is_valid_origin(origin) {
            errors.push(ValidationError::InvalidOrigin {
                value: origin.clone(),
            });
        }
    }

    check_prefix(&mut errors, "api_prefix", &config.routes.api_prefix);
    for prefix in &config.routes.protected_prefixes {
        check_prefix(&mut errors, "protected_prefixes", prefix);
    }

    if config.rate_limit.window_ms == 0 {
        errors.push(ValidationError::ZeroLimit { field: "window_ms" });
    }
    if config.rate_limit.max_requests == 0 {
        errors.push(ValidationError::ZeroLimit {
            field: "max_requests",
        });
    }
    if config.rate_limit.sweep_interval_secs == Some(0) {
        errors.push(ValidationError::ZeroLimit {
            field: "sweep_interval_secs",
        });
    }

    if config.auth.mode == AuthMode::Bearer && config.auth.tokens.is_empty() {
        errors.push(ValidationError::MissingTokens);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// An origin is `scheme://host[:port]` with nothing after it.
pub fn is_valid_origin(value: &str) -> bool {
    let Ok(url) = Url::parse(value) else {
        return false;
    };
    url.has_host()
        && url.path() == "/"
        && url.query().is_none()
        && url.fragment().is_none()
        && !value.ends_with('/')
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_prefix(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if !value.starts_with('/') {
        errors.push(ValidationError::InvalidPrefix {
            field,
            value: value.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GateConfig::default()).is_ok());
    }

    #[test]
    fn test_origin_shape() {
        assert!(is_valid_origin("https://admin.example.com"));
        assert!(is_valid_origin("http://localhost:3000"));
        assert!(!is_valid_origin("https://admin.example.com/"));
        assert!(!is_valid_origin("https://admin.example.com/path"));
        assert!(!is_valid_origin("admin.example.com"));
        assert!(!is_valid_origin(""));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GateConfig::default();
        config.origins.allowed.push("not an origin".into());
        config.routes.api_prefix = "api".into();
        config.rate_limit.max_requests = 0;
        config.auth.mode = AuthMode::Bearer;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::MissingTokens));
        assert!(errors.contains(&ValidationError::ZeroLimit {
            field: "max_requests"
        }));
    }
}
