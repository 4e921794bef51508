#![forbid(unsafe_code)]

//! Ember Gate: a restartable cinematic text reveal.
//!
//! # Role in Ember Gate
//! This crate is the engine. A first phrase scatters into place, a second
//! decodes from scrambled glyphs, then an ember sweeps across both and every
//! character it touches ignites and dissolves into ash. When the last
//! character is gone a completion callback runs once.
//!
//! # Pipeline
//!
//! ```text
//! CharacterFactory ─▶ ScatterSequencer / ScrambleSequencer
//!                  ─▶ ProximityTracker ─▶ DissolveEmitter ─▶ GateSequence ─▶ callback
//! ```
//!
//! # Hosting
//! The host owns a [`Surface`] (the in-memory [`Stage`] works for terminals and
//! tests), fills the four [`Anchor`] slots, and calls once per frame:
//!
//! ```rust,ignore
//! stage.advance(dt);
//! gate.advance(dt, &mut stage);
//! ```

pub mod config;
pub mod controller;
pub mod dissolve;
pub mod error;
pub mod factory;
pub mod glyphs;
pub mod proximity;
pub mod readiness;
pub mod scatter;
pub mod scramble;
pub mod stage;
pub mod surface;
pub mod unit;
pub mod unlock;

pub use config::GateConfig;
pub use controller::{GateSequence, GateState, GateTask, MountOutcome};
pub use error::{ConfigError, Result};
pub use glyphs::{BLANK, GlyphSet};
pub use readiness::{Anchor, ReadinessGate};
pub use scramble::RevealOrder;
pub use stage::Stage;
pub use surface::{Markers, NodeId, ParticleSpec, Surface};
pub use unit::{CharacterUnit, UnitArena, UnitRole};
pub use unlock::UnlockInput;
