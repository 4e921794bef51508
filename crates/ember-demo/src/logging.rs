//! Log sink for the player.
//!
//! The terminal is in raw mode while the cinematic plays, so logs never go to
//! stdout. They go to a file when one is given and are dropped otherwise.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::{DemoError, Result};

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "EMBER_LOG";

/// Filter used when [`LOG_ENV`] is unset or invalid.
pub const DEFAULT_FILTER: &str = "ember_gate=info,ember_demo=info";

/// Build the filter from the environment, falling back to [`DEFAULT_FILTER`].
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a global subscriber that appends to `path`.
///
/// Without a path nothing is installed and every event is discarded.
pub fn init(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| DemoError::Logging(e.to_string()))
}
