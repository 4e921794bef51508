#![forbid(unsafe_code)]

//! Timeline: declarative phase sequencing.
//!
//! A [`SequenceTimeline`] is an ordered list of phases. Each phase starts a
//! fixed gap after the previous phase ends and lasts a fixed duration. The
//! timeline does not tick anything itself; a controller reads it to decide
//! when to enter the next phase.
//!
//! # Usage
//!
//! ```
//! use std::time::Duration;
//! use ember_core::animation::SequenceTimeline;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! enum Step { Intro, Hold, Outro }
//!
//! let tl = SequenceTimeline::new()
//!     .then(Step::Intro, Duration::from_millis(500))
//!     .then(Step::Hold, Duration::from_millis(200))
//!     .then_after(Duration::from_millis(100), Step::Outro, Duration::from_millis(300));
//!
//! assert_eq!(tl.start_of(Step::Outro), Some(Duration::from_millis(800)));
//! assert_eq!(tl.total(), Duration::from_millis(1100));
//! ```
//!
//! # Invariants
//!
//! 1. Phases are stored in insertion order and their start offsets never
//!    decrease.
//! 2. `start(n+1) >= end(n)`: a phase never begins before its predecessor's
//!    declared duration has elapsed.
//! 3. `total()` is the end of the last phase (zero for an empty timeline).
//!
//! # Failure Modes
//!
//! - Duplicate phase kinds: lookups by kind return the first occurrence.
//! - Empty timeline: `phase_at` is always `None` and `total()` is zero.

use std::time::Duration;

/// One phase of a [`SequenceTimeline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phase<K> {
    pub kind: K,
    /// Absolute start offset from the beginning of the timeline.
    pub start: Duration,
    pub duration: Duration,
}

impl<K> Phase<K> {
    /// Absolute end offset.
    #[inline]
    pub fn end(&self) -> Duration {
        self.start.saturating_add(self.duration)
    }
}

/// An ordered, gap-aware sequence of phases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceTimeline<K> {
    phases: Vec<Phase<K>>,
}

impl<K> Default for SequenceTimeline<K> {
    fn default() -> Self {
        Self { phases: Vec::new() }
    }
}

impl<K: Copy + PartialEq> SequenceTimeline<K> {
    /// Create an empty timeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a phase that starts as soon as the previous phase ends (builder pattern).
    #[must_use]
    pub fn then(self, kind: K, duration: Duration) -> Self {
        self.then_after(Duration::ZERO, kind, duration)
    }

    /// Append a phase that starts `gap` after the previous phase ends (builder pattern).
    #[must_use]
    pub fn then_after(mut self, gap: Duration, kind: K, duration: Duration) -> Self {
        let start = self.total().saturating_add(gap);
        self.phases.push(Phase {
            kind,
            start,
            duration,
        });
        self
    }

    /// All phases in order.
    #[inline]
    pub fn phases(&self) -> &[Phase<K>] {
        &self.phases
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// End of the last phase.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.phases.last().map_or(Duration::ZERO, Phase::end)
    }

    /// The first phase with the given kind.
    #[must_use]
    pub fn get(&self, kind: K) -> Option<&Phase<K>> {
        self.phases.iter().find(|p| p.kind == kind)
    }

    /// Absolute start offset of a phase.
    #[must_use]
    pub fn start_of(&self, kind: K) -> Option<Duration> {
        self.get(kind).map(|p| p.start)
    }

    /// Declared duration of a phase.
    #[must_use]
    pub fn duration_of(&self, kind: K) -> Option<Duration> {
        self.get(kind).map(|p| p.duration)
    }

    /// The phase that follows `kind`, with the delay between `kind` starting
    /// and the successor starting.
    #[must_use]
    pub fn successor(&self, kind: K) -> Option<(K, Duration)> {
        let idx = self.phases.iter().position(|p| p.kind == kind)?;
        let current = self.phases[idx];
        self.phases
            .get(idx + 1)
            .map(|next| (next.kind, next.start.saturating_sub(current.start)))
    }

    /// Which phase is active at time `t` (`start <= t < end`).
    ///
    /// Zero-length phases are never reported; gaps between phases report `None`.
    #[must_use]
    pub fn phase_at(&self, t: Duration) -> Option<K> {
        self.phases
            .iter()
            .find(|p| p.start <= t && t < p.end())
            .map(|p| p.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum K {
        A,
        B,
        C,
    }

    const MS_100: Duration = Duration::from_millis(100);
    const MS_200: Duration = Duration::from_millis(200);

    #[test]
    fn empty_timeline() {
        let tl: SequenceTimeline<K> = SequenceTimeline::new();
        assert!(tl.is_empty());
        assert_eq!(tl.total(), Duration::ZERO);
        assert_eq!(tl.phase_at(Duration::ZERO), None);
    }

    #[test]
    fn sequential_phases_chain_end_to_start() {
        let tl = SequenceTimeline::new()
            .then(K::A, MS_100)
            .then(K::B, MS_200)
            .then(K::C, MS_100);
        assert_eq!(tl.start_of(K::B), Some(MS_100));
        assert_eq!(tl.start_of(K::C), Some(Duration::from_millis(300)));
        assert_eq!(tl.total(), Duration::from_millis(400));
    }

    #[test]
    fn gaps_are_respected() {
        let tl = SequenceTimeline::new()
            .then(K::A, MS_100)
            .then_after(MS_200, K::B, MS_100);
        assert_eq!(tl.start_of(K::B), Some(Duration::from_millis(300)));
        assert_eq!(tl.phase_at(Duration::from_millis(150)), None);
        assert_eq!(tl.phase_at(Duration::from_millis(350)), Some(K::B));
    }

    #[test]
    fn successor_delay_is_measured_from_start() {
        let tl = SequenceTimeline::new()
            .then(K::A, MS_100)
            .then_after(MS_200, K::B, MS_100);
        assert_eq!(tl.successor(K::A), Some((K::B, Duration::from_millis(300))));
        assert_eq!(tl.successor(K::B), None);
    }

    #[test]
    fn zero_length_phase_is_never_active() {
        let tl = SequenceTimeline::new()
            .then(K::A, Duration::ZERO)
            .then(K::B, MS_100);
        assert_eq!(tl.phase_at(Duration::ZERO), Some(K::B));
        assert_eq!(tl.duration_of(K::A), Some(Duration::ZERO));
    }
}
