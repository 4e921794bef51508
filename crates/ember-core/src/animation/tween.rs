#![forbid(unsafe_code)]

//! Style tweens: one node, one target pose, one duration.
//!
//! A [`Tween`] is the declarative request ("move this node to that pose over
//! 800ms after a 120ms delay"). An [`ActiveTween`] is the running instance the
//! render surface advances every frame.
//!
//! # Invariants
//!
//! 1. Nothing changes until `delay` has elapsed.
//! 2. When `from` is `None`, the starting pose is captured from the node the
//!    first time the tween leaves its delay, not when it was created.
//! 3. A finished tween always lands exactly on `to` (no easing residue).
//!
//! # Failure Modes
//!
//! - Zero duration: the tween jumps to `to` as soon as the delay elapses.

use std::time::Duration;

use super::{Easing, NodeStyle};

/// A request to animate a node's style.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    /// Explicit starting pose. `None` starts from the node's current pose.
    pub from: Option<NodeStyle>,
    /// Target pose.
    pub to: NodeStyle,
    pub duration: Duration,
    pub delay: Duration,
    pub easing: Easing,
    /// Remove the node from the surface once the tween completes.
    pub remove_on_complete: bool,
}

impl Tween {
    /// Tween from the node's current pose to `to`.
    #[must_use]
    pub fn to(to: NodeStyle, duration: Duration) -> Self {
        Self {
            from: None,
            to,
            duration,
            delay: Duration::ZERO,
            easing: Easing::Linear,
            remove_on_complete: false,
        }
    }

    /// Set an explicit starting pose (builder pattern).
    #[must_use]
    pub fn from(mut self, from: NodeStyle) -> Self {
        self.from = Some(from);
        self
    }

    /// Set the start delay (builder pattern).
    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set the easing curve (builder pattern).
    #[must_use]
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Mark the node for removal when the tween completes (builder pattern).
    #[must_use]
    pub fn remove_on_complete(mut self) -> Self {
        self.remove_on_complete = true;
        self
    }

    /// Delay plus duration.
    #[inline]
    pub fn end(&self) -> Duration {
        self.delay.saturating_add(self.duration)
    }
}

/// Result of advancing an [`ActiveTween`] by one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TweenStep {
    /// Still inside the delay; the node keeps its pose.
    Waiting,
    /// The node should take this pose.
    Running(NodeStyle),
    /// The tween has landed on its target pose.
    Finished(NodeStyle),
}

/// A running tween.
#[derive(Debug, Clone)]
pub struct ActiveTween {
    tween: Tween,
    elapsed: Duration,
    start: Option<NodeStyle>,
}

impl ActiveTween {
    #[must_use]
    pub fn new(tween: Tween) -> Self {
        let start = tween.from;
        Self {
            tween,
            elapsed: Duration::ZERO,
            start,
        }
    }

    /// The request this tween was created from.
    #[inline]
    pub fn tween(&self) -> &Tween {
        &self.tween
    }

    /// Time since the tween was started (including its delay).
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Advance by `dt`. `current` is the node's pose right now, used when the
    /// tween has no explicit starting pose.
    pub fn advance(&mut self, dt: Duration, current: NodeStyle) -> TweenStep {
        self.elapsed = self.elapsed.saturating_add(dt);
        if self.elapsed < self.tween.delay {
            return TweenStep::Waiting;
        }
        let start = *self.start.get_or_insert(current);
        let run = self.elapsed - self.tween.delay;
        if self.tween.duration.is_zero() || run >= self.tween.duration {
            return TweenStep::Finished(self.tween.to.clamped());
        }
        let t = run.as_secs_f64() / self.tween.duration.as_secs_f64();
        TweenStep::Running(start.lerp(&self.tween.to, self.tween.easing.apply(t)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS_100: Duration = Duration::from_millis(100);

    #[test]
    fn waits_for_delay() {
        let mut t = ActiveTween::new(
            Tween::to(NodeStyle::HIDDEN, MS_100).delay(Duration::from_millis(50)),
        );
        assert_eq!(t.advance(Duration::from_millis(40), NodeStyle::REST), TweenStep::Waiting);
        match t.advance(Duration::from_millis(60), NodeStyle::REST) {
            TweenStep::Running(s) => assert!((s.opacity - 0.9).abs() < 1e-9),
            other => panic!("expected running, got {other:?}"),
        }
    }

    #[test]
    fn captures_start_after_delay() {
        let mut t = ActiveTween::new(Tween::to(NodeStyle::at(100.0, 0.0), MS_100).delay(MS_100));
        let _ = t.advance(Duration::from_millis(10), NodeStyle::REST);
        // Node moved while the tween was waiting; the tween starts from there.
        match t.advance(Duration::from_millis(140), NodeStyle::at(50.0, 0.0)) {
            TweenStep::Running(s) => assert!((s.dx - 75.0).abs() < 1e-9),
            other => panic!("expected running, got {other:?}"),
        }
    }

    #[test]
    fn finishes_exactly_on_target() {
        let target = NodeStyle::at(3.0, -4.0).with_opacity(0.0);
        let mut t = ActiveTween::new(
            Tween::to(target, MS_100).easing(Easing::Back).from(NodeStyle::REST),
        );
        assert_eq!(t.advance(Duration::from_millis(250), NodeStyle::REST), TweenStep::Finished(target));
    }

    #[test]
    fn zero_duration_jumps() {
        let mut t = ActiveTween::new(Tween::to(NodeStyle::HIDDEN, Duration::ZERO));
        assert_eq!(
            t.advance(Duration::ZERO, NodeStyle::REST),
            TweenStep::Finished(NodeStyle::HIDDEN)
        );
    }
}
