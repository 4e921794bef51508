#![forbid(unsafe_code)]

//! Tracing re-exports.
//!
//! Code in this crate logs through these so the `tracing` dependency can be
//! switched off with the `tracing` feature.

pub use tracing::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
