#![forbid(unsafe_code)]

//! Animation primitives: easing curves, node styles, tweens, and phase timelines.
//!
//! Everything here is pure and time-explicit: callers pass `Duration` deltas,
//! nothing reads the wall clock. That keeps the cinematic reproducible under a
//! virtual-time scheduler and in tests.

mod easing;
mod style;
mod timeline;
mod tween;

pub use easing::Easing;
pub use style::NodeStyle;
pub use timeline::{Phase, SequenceTimeline};
pub use tween::{ActiveTween, Tween, TweenStep};
