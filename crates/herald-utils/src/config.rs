//! Configuration management utilities
//!
//! Small helpers for reading typed values from environment variables. A
//! variable that is set but blank is treated the same as an unset one.

use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while reading configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set
    #[error("{0} is not set")]
    Missing(String),

    /// A variable is set but cannot be parsed
    #[error("{key} has an invalid value '{value}': {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
}

/// Read a variable, returning `None` when it is unset or blank
pub fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Read a variable that must be present
pub fn require_env(key: &str) -> Result<String, ConfigError> {
    optional_env(key).ok_or_else(|| ConfigError::Missing(key.to_string()))
}

/// Read a string variable with a default
pub fn env_string_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Read and parse a variable, falling back to `default` when unset
pub fn env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match optional_env(key) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key: key.to_string(),
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

/// Read a comma-separated list; empty items are dropped
pub fn env_list(key: &str) -> Vec<String> {
    optional_env(key)
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_env_missing() {
        unsafe {
            std::env::remove_var("HERALD_UTILS_TEST_MISSING");
        }
        let err = require_env("HERALD_UTILS_TEST_MISSING").unwrap_err();
        assert_eq!(err, ConfigError::Missing("HERALD_UTILS_TEST_MISSING".to_string()));
        assert_eq!(err.to_string(), "HERALD_UTILS_TEST_MISSING is not set");
    }

    #[test]
    fn test_blank_counts_as_unset() {
        unsafe {
            std::env::set_var("HERALD_UTILS_TEST_BLANK", "   ");
        }
        assert!(optional_env("HERALD_UTILS_TEST_BLANK").is_none());
        assert_eq!(env_string_or("HERALD_UTILS_TEST_BLANK", "fallback"), "fallback");
        unsafe {
            std::env::remove_var("HERALD_UTILS_TEST_BLANK");
        }
    }

    #[test]
    fn test_env_or_parses_and_defaults() {
        unsafe {
            std::env::set_var("HERALD_UTILS_TEST_NUM", "42");
            std::env::remove_var("HERALD_UTILS_TEST_NUM_UNSET");
        }
        assert_eq!(env_or("HERALD_UTILS_TEST_NUM", 7_u64).unwrap(), 42);
        assert_eq!(env_or("HERALD_UTILS_TEST_NUM_UNSET", 7_u64).unwrap(), 7);
        unsafe {
            std::env::remove_var("HERALD_UTILS_TEST_NUM");
        }
    }

    #[test]
    fn test_env_or_invalid() {
        unsafe {
            std::env::set_var("HERALD_UTILS_TEST_BAD", "soon");
        }
        let err = env_or("HERALD_UTILS_TEST_BAD", 1_u64).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref value, .. } if value == "soon"));
        unsafe {
            std::env::remove_var("HERALD_UTILS_TEST_BAD");
        }
    }

    #[test]
    fn test_env_list() {
        unsafe {
            std::env::set_var("HERALD_UTILS_TEST_LIST", "1, 2,,3 ");
        }
        assert_eq!(env_list("HERALD_UTILS_TEST_LIST"), vec!["1", "2", "3"]);
        unsafe {
            std::env::remove_var("HERALD_UTILS_TEST_LIST");
        }
        assert!(env_list("HERALD_UTILS_TEST_LIST").is_empty());
    }
}
