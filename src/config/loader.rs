//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GateConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding extra allowed origins, comma-separated.
pub const ALLOWED_ORIGINS_ENV: &str = "ALLOWED_ORIGINS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GateConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: GateConfig = toml::from_str(&content)?;

    apply_env(&mut config, std::env::var(ALLOWED_ORIGINS_ENV).ok().as_deref());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load from `path` when given, otherwise start from defaults plus the environment.
pub fn load_or_default(path: Option<&Path>) -> Result<GateConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let mut config = GateConfig::default();
            apply_env(&mut config, std::env::var(ALLOWED_ORIGINS_ENV).ok().as_deref());
            validate_config(&config).map_err(ConfigError::Validation)?;
            Ok(config)
        }
    }
}

/// Append origins from a comma-separated list, skipping blanks and duplicates.
pub fn apply_env(config: &mut GateConfig, allowed_origins: Option<&str>) {
    let Some(list) = allowed_origins else {
        return;
    };
    for origin in parse_origin_list(list) {
        if !config.origins.allowed.contains(&origin) {
            config.origins.allowed.push(origin);
        }
    }
}

/// Split a comma-separated origin list, trimming each entry.
pub fn parse_origin_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}
