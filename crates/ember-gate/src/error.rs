#![forbid(unsafe_code)]

//! Errors at the crate's fallible edges.
//!
//! The cinematic itself never fails: not-ready surfaces are deferred and
//! reported through [`MountOutcome`](crate::controller::MountOutcome). Only
//! loading configuration from outside the process can go wrong.

use thiserror::Error;

/// Failure to load or validate a [`GateConfig`](crate::config::GateConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error reading a file.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
    /// Parsed, but out of range.
    #[error("config failed validation: {}", .0.join("; "))]
    Validation(Vec<String>),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
