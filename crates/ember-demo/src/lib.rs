#![forbid(unsafe_code)]

//! Terminal player for the ember gate cinematic.
//!
//! The binary is a thin shell: [`cli`] parses arguments, [`player`] runs the
//! host loop, [`canvas`] turns the stage into cells, and [`terminal`] owns the
//! raw-mode session.

pub mod canvas;
pub mod cli;
pub mod error;
pub mod logging;
pub mod player;
pub mod terminal;

pub use cli::{Cli, Commands, run, run_from_env};
pub use error::{DemoError, Result};
