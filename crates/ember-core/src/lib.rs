#![forbid(unsafe_code)]

//! Core: geometry, animation primitives, and the frame clock.
//!
//! # Role in Ember Gate
//! `ember-core` holds the pieces every other crate agrees on: screen-space
//! boxes for proximity checks, the `NodeStyle` pose that tweens interpolate,
//! easing curves, and the declarative `SequenceTimeline` that orders the
//! cinematic's phases.
//!
//! # How it fits in the system
//! `ember-runtime` schedules work in virtual time, `ember-gate` builds the
//! cinematic on top of both, and `ember-demo` paints it into a terminal.

pub mod animation;
pub mod clock;
pub mod geometry;
#[cfg(feature = "tracing")]
pub mod logging;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
