//! Series policy configuration.
//!
//! The default policy is embedded at compile time from
//! `config/policy.toml`. Setting `PORT_OPS_POLICY` to the path of another
//! TOML file replaces it; keys missing from that file keep their
//! built-in defaults.

use std::path::Path;

use port_ops_analytics_models::SeriesPolicy;
use thiserror::Error;

/// Embedded default policy.
const DEFAULT_POLICY: &str = include_str!("../config/policy.toml");

/// Errors loading the series policy.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The policy file could not be read.
    #[error("Failed to read policy file: {0}")]
    Io(#[from] std::io::Error),

    /// The policy is not valid TOML or has bad values.
    #[error("Invalid policy: {0}")]
    Parse(String),
}

/// Parses a policy TOML document.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if the document is invalid.
pub fn parse_policy(toml_str: &str) -> Result<SeriesPolicy, ConfigError> {
    let policy: SeriesPolicy =
        toml::de::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))?;

    if policy.year_series_width == 0 {
        return Err(ConfigError::Parse(
            "year_series_width must be at least 1".to_string(),
        ));
    }
    if policy.total_berths == 0 {
        return Err(ConfigError::Parse(
            "total_berths must be at least 1".to_string(),
        ));
    }

    Ok(policy)
}

/// Loads the policy from `path`, or the embedded default when `None`.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file cannot be read or parsed.
pub fn load_policy(path: Option<&Path>) -> Result<SeriesPolicy, ConfigError> {
    match path {
        Some(path) => {
            log::info!("Loading series policy from {}", path.display());
            parse_policy(&std::fs::read_to_string(path)?)
        }
        None => parse_policy(DEFAULT_POLICY),
    }
}

/// Loads the policy named by `PORT_OPS_POLICY`.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file cannot be read or parsed.
pub fn policy_from_env() -> Result<SeriesPolicy, ConfigError> {
    let path = std::env::var("PORT_OPS_POLICY")
        .ok()
        .filter(|v| !v.trim().is_empty());
    load_policy(path.as_deref().map(Path::new))
}
