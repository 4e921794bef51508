#![forbid(unsafe_code)]

//! Configuration for the gate cinematic.
//!
//! Every tunable lives in one [`GateConfig`] that can be built in code or,
//! with the `config` feature, loaded from TOML or JSON. All durations are
//! written as milliseconds in files.
//!
//! # Loading
//!
//! ```toml
//! # gate.toml
//! proximity_threshold = 24.0
//!
//! [phrases]
//! scatter = "THE GATE REMEMBERS"
//! scramble = "SPEAK AND ENTER"
//!
//! [scramble]
//! glyphs = "katakana"
//! order = "center"
//! speed_ms = 40
//! ```
//!
//! ```rust,ignore
//! let config = GateConfig::from_toml_file("gate.toml")?;
//! ```
//!
//! # Defaults
//!
//! Every field has a default, so a partial file only overrides what it names.

#[cfg(feature = "config")]
use std::path::Path;
use std::time::Duration;

use ember_core::animation::Easing;
use rand::Rng;
#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "config")]
use crate::error::Result;
use crate::error::ConfigError;
use crate::glyphs::GlyphSet;
use crate::scramble::RevealOrder;

/// Upper bound on particles spawned per character.
pub const MAX_PARTICLES_PER_CHAR: usize = 64;

// ---------------------------------------------------------------------------
// Ranges
// ---------------------------------------------------------------------------

/// A closed range of floating-point values sampled uniformly.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
pub struct Span {
    pub min: f64,
    pub max: f64,
}

impl Span {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Symmetric range `-magnitude..=magnitude`.
    pub const fn symmetric(magnitude: f64) -> Self {
        Self {
            min: -magnitude,
            max: magnitude,
        }
    }

    /// Draw a value. A degenerate range (`max <= min`) always yields `min`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.max <= self.min {
            self.min
        } else {
            rng.random_range(self.min..self.max)
        }
    }

    pub fn is_ordered(&self) -> bool {
        self.min <= self.max
    }
}

/// A closed range of durations sampled uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
pub struct DurationSpan {
    #[cfg_attr(feature = "config", serde(rename = "min_ms", with = "millis"))]
    pub min: Duration,
    #[cfg_attr(feature = "config", serde(rename = "max_ms", with = "millis"))]
    pub max: Duration,
}

impl DurationSpan {
    pub const fn from_millis(min: u64, max: u64) -> Self {
        Self {
            min: Duration::from_millis(min),
            max: Duration::from_millis(max),
        }
    }

    /// Draw a duration with millisecond resolution.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let lo = self.min.as_millis() as u64;
        let hi = self.max.as_millis() as u64;
        if hi <= lo {
            self.min
        } else {
            Duration::from_millis(rng.random_range(lo..=hi))
        }
    }

    /// The longest duration this span can produce.
    pub fn longest(&self) -> Duration {
        self.min.max(self.max)
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// The two phrases the cinematic reveals.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct PhraseConfig {
    /// Flies in from scattered offsets.
    pub scatter: String,
    /// Decodes from scrambled glyphs.
    pub scramble: String,
}

impl Default for PhraseConfig {
    fn default() -> Self {
        Self {
            scatter: "THE GATE REMEMBERS".to_string(),
            scramble: "SPEAK AND ENTER".to_string(),
        }
    }
}

/// Scatter entrance parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ScatterConfig {
    /// Per-character flight time.
    #[cfg_attr(feature = "config", serde(rename = "duration_ms", with = "millis"))]
    pub duration: Duration,
    /// Delay between successive characters.
    #[cfg_attr(feature = "config", serde(rename = "stagger_ms", with = "millis"))]
    pub stagger: Duration,
    /// Delay before the first character moves.
    #[cfg_attr(feature = "config", serde(rename = "delay_ms", with = "millis"))]
    pub delay: Duration,
    /// Horizontal start offset (px).
    pub offset_x: Span,
    /// Vertical start offset (px).
    pub offset_y: Span,
    /// Start rotation (degrees).
    pub rotation: Span,
    pub easing: Easing,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(1200),
            stagger: Duration::from_millis(50),
            delay: Duration::from_millis(200),
            offset_x: Span::symmetric(400.0),
            offset_y: Span::symmetric(250.0),
            rotation: Span::symmetric(180.0),
            easing: Easing::EaseOutExpo,
        }
    }
}

/// Scramble decode parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ScrambleConfig {
    pub glyphs: GlyphSet,
    /// Interval between placeholder swaps.
    #[cfg_attr(feature = "config", serde(rename = "speed_ms", with = "millis"))]
    pub speed: Duration,
    /// How long a character scrambles once its turn starts.
    #[cfg_attr(feature = "config", serde(rename = "duration_ms", with = "millis"))]
    pub duration: Duration,
    /// Delay per reveal-order position.
    #[cfg_attr(feature = "config", serde(rename = "stagger_ms", with = "millis"))]
    pub stagger: Duration,
    pub order: RevealOrder,
}

impl Default for ScrambleConfig {
    fn default() -> Self {
        Self {
            glyphs: GlyphSet::Alphanumeric,
            speed: Duration::from_millis(50),
            duration: Duration::from_millis(800),
            stagger: Duration::from_millis(60),
            order: RevealOrder::Left,
        }
    }
}

/// Holds between phases.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct PauseConfig {
    #[cfg_attr(feature = "config", serde(rename = "after_scatter_ms", with = "millis"))]
    pub after_scatter: Duration,
    #[cfg_attr(feature = "config", serde(rename = "after_scramble_ms", with = "millis"))]
    pub after_scramble: Duration,
}

impl Default for PauseConfig {
    fn default() -> Self {
        Self {
            after_scatter: Duration::from_millis(600),
            after_scramble: Duration::from_millis(800),
        }
    }
}

/// Ignite, ash, and completion parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct DissolveConfig {
    /// Particles spawned per dissolving character.
    pub particle_count: usize,
    pub particle_duration: DurationSpan,
    /// Drift distance (px).
    pub particle_distance: Span,
    /// Rotation delta (degrees).
    pub particle_rotation: Span,
    /// Final particle scale.
    pub particle_scale: Span,
    /// Hold between a character igniting and dissolving.
    #[cfg_attr(feature = "config", serde(rename = "ignite_delay_ms", with = "millis"))]
    pub ignite_delay: Duration,
    /// Fade-out time of the source character.
    #[cfg_attr(feature = "config", serde(rename = "source_fade_ms", with = "millis"))]
    pub source_fade: Duration,
    /// Final scale of the source character.
    pub source_scale: f64,
    /// Extra wait after the longest particle before completion fires.
    #[cfg_attr(feature = "config", serde(rename = "completion_margin_ms", with = "millis"))]
    pub completion_margin: Duration,
}

impl Default for DissolveConfig {
    fn default() -> Self {
        Self {
            particle_count: 8,
            particle_duration: DurationSpan::from_millis(800, 1600),
            particle_distance: Span::new(20.0, 60.0),
            particle_rotation: Span::symmetric(360.0),
            particle_scale: Span::new(0.0, 0.3),
            ignite_delay: Duration::from_millis(150),
            source_fade: Duration::from_millis(400),
            source_scale: 0.8,
            completion_margin: Duration::from_millis(200),
        }
    }
}

impl DissolveConfig {
    /// Delay between the last dissolve and the completion callback.
    ///
    /// Sized to outlast both the longest particle and the source fade.
    pub fn completion_delay(&self) -> Duration {
        self.particle_duration
            .longest()
            .max(self.source_fade)
            .saturating_add(self.completion_margin)
    }
}

/// Ember sweep parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct EmitterConfig {
    /// Time for the lead ember to cross the panel.
    #[cfg_attr(feature = "config", serde(rename = "sweep_ms", with = "millis"))]
    pub sweep: Duration,
    /// How far past each panel edge the sweep starts and ends (px).
    pub overshoot: f64,
    /// Delay between successive trail embers.
    #[cfg_attr(feature = "config", serde(rename = "trail_lag_ms", with = "millis"))]
    pub trail_lag: Duration,
    /// Fade-out time of the trail once every character has dissolved.
    #[cfg_attr(feature = "config", serde(rename = "trail_fade_ms", with = "millis"))]
    pub trail_fade: Duration,
    pub easing: Easing,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            sweep: Duration::from_millis(3000),
            overshoot: 40.0,
            trail_lag: Duration::from_millis(40),
            trail_fade: Duration::from_millis(500),
            easing: Easing::EaseInOut,
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level GateConfig
// ---------------------------------------------------------------------------

/// Every tunable of the gate cinematic.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct GateConfig {
    pub phrases: PhraseConfig,
    /// Horizontal distance (px) at which the ember ignites a character.
    pub proximity_threshold: f64,
    pub scatter: ScatterConfig,
    pub scramble: ScrambleConfig,
    pub pauses: PauseConfig,
    pub dissolve: DissolveConfig,
    pub emitter: EmitterConfig,
    /// Fixed RNG seed. `None` seeds from the OS.
    pub seed: Option<u64>,
}

/// Default ignition distance in pixels.
pub const DEFAULT_PROXIMITY_THRESHOLD: f64 = 30.0;

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            phrases: PhraseConfig::default(),
            proximity_threshold: DEFAULT_PROXIMITY_THRESHOLD,
            scatter: ScatterConfig::default(),
            scramble: ScrambleConfig::default(),
            pauses: PauseConfig::default(),
            dissolve: DissolveConfig::default(),
            emitter: EmitterConfig::default(),
            seed: None,
        }
    }
}

impl GateConfig {
    /// Defaults with both phrases replaced.
    #[must_use]
    pub fn with_phrases(scatter: impl Into<String>, scramble: impl Into<String>) -> Self {
        Self {
            phrases: PhraseConfig {
                scatter: scatter.into(),
                scramble: scramble.into(),
            },
            ..Self::default()
        }
    }

    /// Set the RNG seed (builder pattern).
    #[must_use]
    pub fn seeded(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validated()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s)?;
        config.validated()
    }

    /// Load from a file, picking the format by extension (`.json` or TOML).
    #[cfg(feature = "config")]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    /// Serialize to pretty TOML.
    #[cfg(feature = "config")]
    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Return `self` if valid, otherwise every problem found.
    pub fn validated(self) -> std::result::Result<Self, ConfigError> {
        let problems = self.validate();
        if problems.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(problems))
        }
    }

    /// Check all parameters are within acceptable ranges.
    ///
    /// Returns a list of problems. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !(self.proximity_threshold > 0.0 && self.proximity_threshold.is_finite()) {
            errors.push(format!(
                "proximity_threshold must be a positive number, got {}",
                self.proximity_threshold
            ));
        }

        for (name, span) in [
            ("scatter.offset_x", self.scatter.offset_x),
            ("scatter.offset_y", self.scatter.offset_y),
            ("scatter.rotation", self.scatter.rotation),
            ("dissolve.particle_distance", self.dissolve.particle_distance),
            ("dissolve.particle_rotation", self.dissolve.particle_rotation),
            ("dissolve.particle_scale", self.dissolve.particle_scale),
        ] {
            if !span.is_ordered() {
                errors.push(format!(
                    "{name} min must be <= max, got {}..{}",
                    span.min, span.max
                ));
            }
        }

        if self.scramble.speed.is_zero() {
            errors.push("scramble.speed_ms must be > 0".into());
        }
        if self.scramble.glyphs.is_empty_custom() {
            errors.push("scramble.glyphs custom set has no usable characters".into());
        }

        if self.dissolve.particle_count > MAX_PARTICLES_PER_CHAR {
            errors.push(format!(
                "dissolve.particle_count must be <= {MAX_PARTICLES_PER_CHAR}, got {}",
                self.dissolve.particle_count
            ));
        }
        if self.dissolve.particle_duration.min > self.dissolve.particle_duration.max {
            errors.push("dissolve.particle_duration min_ms must be <= max_ms".into());
        }
        if self.dissolve.particle_duration.min.is_zero() {
            errors.push("dissolve.particle_duration min_ms must be > 0".into());
        }
        if self.dissolve.particle_scale.min < 0.0 {
            errors.push("dissolve.particle_scale must be >= 0".into());
        }
        if !(0.0..=1.0).contains(&self.dissolve.source_scale) {
            errors.push(format!(
                "dissolve.source_scale must be in [0, 1], got {}",
                self.dissolve.source_scale
            ));
        }

        if self.emitter.sweep.is_zero() {
            errors.push("emitter.sweep_ms must be > 0".into());
        }
        if self.emitter.overshoot < 0.0 {
            errors.push(format!(
                "emitter.overshoot must be >= 0, got {}",
                self.emitter.overshoot
            ));
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// Millisecond serde helpers
// ---------------------------------------------------------------------------

#[cfg(feature = "config")]
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(GateConfig::default().validate().is_empty());
    }

    #[test]
    fn completion_delay_outlasts_particles_and_fade() {
        let mut d = DissolveConfig::default();
        assert_eq!(d.completion_delay(), Duration::from_millis(1800));
        d.source_fade = Duration::from_millis(2000);
        assert_eq!(d.completion_delay(), Duration::from_millis(2200));
    }

    #[test]
    fn every_problem_is_reported() {
        let mut config = GateConfig::default();
        config.proximity_threshold = f64::NAN;
        config.scramble.speed = Duration::ZERO;
        config.scatter.offset_x = Span::new(5.0, -5.0);
        config.dissolve.particle_count = MAX_PARTICLES_PER_CHAR + 1;
        config.emitter.overshoot = -1.0;
        let problems = config.validate();
        assert_eq!(problems.len(), 5, "{problems:?}");
        assert!(problems.iter().any(|p| p.contains("scatter.offset_x")));
        match config.validated() {
            Err(ConfigError::Validation(list)) => assert_eq!(list, problems),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn blank_custom_glyphs_are_rejected() {
        let mut config = GateConfig::default();
        config.scramble.glyphs = GlyphSet::Custom("  ".into());
        assert_eq!(config.validate().len(), 1);
        assert_eq!(config.scramble.glyphs.table(), GlyphSet::Alphanumeric.table());
    }

    #[test]
    fn spans_sample_inside_their_range() {
        let mut rng = <rand::rngs::SmallRng as rand::SeedableRng>::seed_from_u64(1);
        let span = Span::new(-2.0, 3.0);
        let durations = DurationSpan::from_millis(10, 20);
        for _ in 0..100 {
            let v = span.sample(&mut rng);
            assert!((-2.0..3.0).contains(&v));
            let d = durations.sample(&mut rng);
            assert!(d >= durations.min && d <= durations.max);
        }
        assert_eq!(Span::new(4.0, 4.0).sample(&mut rng), 4.0);
    }

    #[cfg(feature = "config")]
    mod files {
        use super::*;

        #[test]
        fn partial_toml_keeps_defaults() {
            let config = GateConfig::from_toml_str(
                r#"
                proximity_threshold = 24.0

                [phrases]
                scatter = "HELLO"

                [scramble]
                glyphs = "katakana"
                order = "center"
                speed_ms = 40
                "#,
            )
            .unwrap();
            assert_eq!(config.proximity_threshold, 24.0);
            assert_eq!(config.phrases.scatter, "HELLO");
            assert_eq!(config.phrases.scramble, PhraseConfig::default().scramble);
            assert_eq!(config.scramble.glyphs, GlyphSet::Katakana);
            assert_eq!(config.scramble.order, RevealOrder::Center);
            assert_eq!(config.scramble.speed, Duration::from_millis(40));
            assert_eq!(config.pauses, PauseConfig::default());
        }

        #[test]
        fn json_and_custom_glyphs() {
            let config = GateConfig::from_json_str(
                r#"{ "seed": 9, "scramble": { "glyphs": { "custom": "01" } },
                     "dissolve": { "particle_duration": { "min_ms": 100, "max_ms": 200 } } }"#,
            )
            .unwrap();
            assert_eq!(config.seed, Some(9));
            assert_eq!(config.scramble.glyphs, GlyphSet::Custom("01".into()));
            assert_eq!(
                config.dissolve.particle_duration,
                DurationSpan::from_millis(100, 200)
            );
        }

        #[test]
        fn invalid_values_fail_to_load() {
            let err = GateConfig::from_toml_str("[emitter]\nsweep_ms = 0").unwrap_err();
            assert!(matches!(err, ConfigError::Validation(_)));
            let err = GateConfig::from_toml_str("proximity_threshold = \"far\"").unwrap_err();
            assert!(matches!(err, ConfigError::Toml(_)));
        }

        #[test]
        fn serialized_config_loads_back() {
            let config = GateConfig::with_phrases("A", "B").seeded(4);
            let text = config.to_toml_string().unwrap();
            assert!(text.contains("speed_ms"));
            assert_eq!(GateConfig::from_toml_str(&text).unwrap(), config);
        }
    }
}
