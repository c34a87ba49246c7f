//! Structured logging.
//!
//! `RUST_LOG` wins over the configured level. JSON output is meant for
//! production log shipping, pretty output for development.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ObservabilityConfig};

/// Install the global subscriber. Fails if one is already set.
pub fn init_logging(
    config: &ObservabilityConfig,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(&config.log_level).into());

    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    }
}

fn default_filter(level: &str) -> String {
    format!("edge_gate={level},tower_http={level}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        let directives = default_filter("debug");
        assert_eq!(directives, "edge_gate=debug,tower_http=debug");
        assert!(EnvFilter::try_new(directives).is_ok());
    }
}
