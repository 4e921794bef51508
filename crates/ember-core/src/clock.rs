#![forbid(unsafe_code)]

//! Frame clock that turns wall time into bounded per-frame deltas.
//!
//! The cinematic itself only ever sees `Duration` deltas. The clock sits at
//! the edge, measuring real elapsed time between frames, applying a speed
//! multiplier, and capping each delta so a stalled terminal does not make the
//! ember teleport across the text.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use ember_core::clock::FrameClock;
//!
//! let mut clock = FrameClock::new().max_delta(Duration::from_millis(50));
//! clock.set_speed(2.0);
//! assert_eq!(clock.scale(Duration::from_millis(10)), Duration::from_millis(20));
//! assert_eq!(clock.scale(Duration::from_millis(80)), Duration::from_millis(50));
//! ```

use std::time::Duration;

use web_time::Instant;

/// Default cap on a single frame delta.
pub const DEFAULT_MAX_DELTA: Duration = Duration::from_millis(100);

/// Wall-clock frame timer.
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// Time multiplier (1.0 = normal, 0.0 = paused, 0.5 = half-speed).
    speed: f64,
    max_delta: Duration,
    last_tick: Instant,
    /// Total scaled time handed out so far.
    elapsed: Duration,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Create a clock starting now.
    #[inline]
    pub fn new() -> Self {
        Self {
            speed: 1.0,
            max_delta: DEFAULT_MAX_DELTA,
            last_tick: Instant::now(),
            elapsed: Duration::ZERO,
        }
    }

    /// Set the per-frame delta cap (builder pattern).
    #[must_use]
    pub fn max_delta(mut self, max: Duration) -> Self {
        self.max_delta = max;
        self
    }

    /// Measure the real time since the last tick and return the scaled delta.
    ///
    /// Call this once per frame.
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let raw = now.duration_since(self.last_tick);
        self.last_tick = now;
        #[cfg(feature = "tracing")]
        if raw > self.max_delta {
            crate::debug!(
                raw_ms = raw.as_millis() as u64,
                cap_ms = self.max_delta.as_millis() as u64,
                "frame delta capped"
            );
        }
        let dt = self.scale(raw);
        self.elapsed = self.elapsed.saturating_add(dt);
        dt
    }

    /// Apply the speed multiplier and cap to a raw delta.
    #[must_use]
    pub fn scale(&self, raw: Duration) -> Duration {
        raw.mul_f64(self.speed).min(self.max_delta)
    }

    /// Total scaled time handed out by [`FrameClock::tick`].
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Set the speed multiplier. Negative values clamp to zero.
    #[inline]
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed.max(0.0);
    }

    /// Pause the clock (equivalent to `set_speed(0.0)`).
    #[inline]
    pub fn pause(&mut self) {
        self.speed = 0.0;
    }

    /// Resume at normal speed.
    #[inline]
    pub fn resume(&mut self) {
        self.speed = 1.0;
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.speed == 0.0
    }

    /// Forget elapsed time and restart the delta measurement from now.
    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
        self.last_tick = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paused_clock_yields_zero() {
        let mut clock = FrameClock::new();
        clock.pause();
        assert!(clock.is_paused());
        assert_eq!(clock.scale(Duration::from_millis(16)), Duration::ZERO);
        clock.resume();
        assert_eq!(clock.scale(Duration::from_millis(16)), Duration::from_millis(16));
    }

    #[test]
    fn negative_speed_clamps() {
        let mut clock = FrameClock::new();
        clock.set_speed(-3.0);
        assert_eq!(clock.speed(), 0.0);
    }

    #[test]
    fn tick_accumulates_elapsed() {
        let mut clock = FrameClock::new();
        let a = clock.tick();
        let b = clock.tick();
        assert_eq!(clock.elapsed(), a + b);
        assert!(a <= DEFAULT_MAX_DELTA);
        clock.reset();
        assert_eq!(clock.elapsed(), Duration::ZERO);
    }
}
