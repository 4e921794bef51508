use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] ember_gate::ConfigError),

    #[error("config file not found: {}", path.display())]
    MissingConfig { path: PathBuf },

    #[error("terminal too small: {cols}x{rows} (need at least {min_cols}x{min_rows})")]
    TerminalTooSmall {
        cols: u16,
        rows: u16,
        min_cols: u16,
        min_rows: u16,
    },

    #[error("gate did not start: {0}")]
    NotStarted(String),

    #[error("could not serialize config: {0}")]
    Serialize(String),

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error("gate still running after {frames} frames")]
    Stalled { frames: usize },
}

impl DemoError {
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::MissingConfig { .. } => 2,
            Self::TerminalTooSmall { .. } => 3,
            Self::NotStarted(_) | Self::Stalled { .. } => 4,
            Self::Io(_) | Self::Logging(_) | Self::Serialize(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, DemoError>;
