//! Shared utilities for herald
//!
//! This crate provides common functionality used across the herald workspace:
//! logging setup and helpers for reading configuration from the environment.

pub mod config;
pub mod logging;

pub use config::{ConfigError, env_list, env_or, env_string_or, optional_env, require_env};
pub use logging::{init_tracing, init_tracing_with_default};
