//! Environment-variable helpers shared by every binary.
//!
//! Each process reads its configuration once at startup. A missing required
//! variable surfaces as [`ConfigError::Missing`] and the binary exits before
//! serving.

use std::str::FromStr;

/// Startup configuration failure.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    /// A variable is present but cannot be parsed.
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Read a required, non-blank variable.
pub fn require(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ConfigError::Missing(name)),
    }
}

/// Read an optional variable, falling back to `default` when unset or blank.
pub fn optional(name: &'static str, default: &str) -> String {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => default.to_string(),
    }
}

/// Read an optional variable and parse it, falling back to `default`.
pub fn parse_or<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => {
            value
                .trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::Invalid {
                    name,
                    reason: e.to_string(),
                })
        }
        _ => Ok(default),
    }
}

/// Read a required comma-separated list. Blank entries are dropped; an empty
/// result counts as missing.
pub fn require_list(name: &'static str) -> Result<Vec<String>, ConfigError> {
    let items = split_list(&require(name)?);
    if items.is_empty() {
        return Err(ConfigError::Missing(name));
    }
    Ok(items)
}

/// Split a comma-separated value into trimmed, non-empty entries.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
