#![forbid(unsafe_code)]

//! Self-terminating per-frame polling loop.
//!
//! A [`FrameLoop`] keeps at most one frame request outstanding and refuses to
//! schedule another once the caller reports no remaining work. It replaces the
//! "callback that re-requests itself" idiom with an explicit two-state machine:
//!
//! ```text
//! Idle ──schedule(remaining > 0)──▶ Scheduled(id)
//!   ▲                                   │
//!   └──────── on_frame(id) / cancel ────┘
//! ```

use crate::scheduler::{Scheduler, TimerId};

/// Loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameLoopState {
    #[default]
    Idle,
    Scheduled(TimerId),
}

/// A polling loop bound to a [`Scheduler`].
#[derive(Debug, Clone, Default)]
pub struct FrameLoop {
    state: FrameLoopState,
    frames_run: u64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn state(&self) -> FrameLoopState {
        self.state
    }

    #[inline]
    pub fn is_scheduled(&self) -> bool {
        matches!(self.state, FrameLoopState::Scheduled(_))
    }

    /// Frames this loop has consumed.
    #[inline]
    pub fn frames_run(&self) -> u64 {
        self.frames_run
    }

    /// Request the next frame if `remaining > 0`.
    ///
    /// Returns `true` when a frame is (or already was) pending. With no
    /// remaining work the loop goes idle and nothing is scheduled.
    pub fn schedule<T>(&mut self, scheduler: &mut Scheduler<T>, remaining: usize, task: T) -> bool {
        if remaining == 0 {
            if let FrameLoopState::Scheduled(id) = self.state {
                scheduler.cancel(id);
            }
            self.state = FrameLoopState::Idle;
            return false;
        }
        if self.is_scheduled() {
            return true;
        }
        let id = scheduler.request_frame(task);
        self.state = FrameLoopState::Scheduled(id);
        true
    }

    /// Acknowledge a frame callback.
    ///
    /// Returns `false` for a stale handle (one this loop no longer owns), in
    /// which case the caller must not poll.
    pub fn on_frame(&mut self, id: TimerId) -> bool {
        if self.state == FrameLoopState::Scheduled(id) {
            self.state = FrameLoopState::Idle;
            self.frames_run += 1;
            true
        } else {
            false
        }
    }

    /// Cancel any outstanding request and go idle.
    pub fn cancel<T>(&mut self, scheduler: &mut Scheduler<T>) {
        if let FrameLoopState::Scheduled(id) = self.state {
            scheduler.cancel(id);
        }
        self.state = FrameLoopState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn stops_when_no_work_remains() {
        let mut s: Scheduler<()> = Scheduler::new();
        let mut lp = FrameLoop::new();
        let mut remaining = 3usize;

        assert!(lp.schedule(&mut s, remaining, ()));
        while remaining > 0 {
            s.begin_frame(Duration::from_millis(16));
            for (id, ()) in s.take_frame_callbacks() {
                assert!(lp.on_frame(id));
                remaining -= 1;
                lp.schedule(&mut s, remaining, ());
            }
        }
        assert_eq!(lp.state(), FrameLoopState::Idle);
        assert_eq!(s.pending(), 0);
        assert_eq!(lp.frames_run(), 3);
    }

    #[test]
    fn never_double_schedules() {
        let mut s: Scheduler<()> = Scheduler::new();
        let mut lp = FrameLoop::new();
        lp.schedule(&mut s, 5, ());
        lp.schedule(&mut s, 5, ());
        assert_eq!(s.pending_counts().frames, 1);
    }

    #[test]
    fn stale_frame_is_rejected() {
        let mut s: Scheduler<()> = Scheduler::new();
        let mut lp = FrameLoop::new();
        lp.schedule(&mut s, 1, ());
        let FrameLoopState::Scheduled(id) = lp.state() else {
            panic!("expected a scheduled frame");
        };
        lp.cancel(&mut s);
        assert_eq!(s.pending(), 0);
        assert!(!lp.on_frame(id));
    }
}
