#![forbid(unsafe_code)]

//! Virtual-time host loop: timeouts, intervals, and animation-frame requests.
//!
//! A [`Scheduler`] is the single owner of every pending callback in a run. It
//! never executes anything itself; it hands back the task values that are due
//! and the caller dispatches them with full `&mut` access to its own state.
//! That keeps the model single-threaded and cooperative: no callback ever runs
//! while another is mid-flight.
//!
//! # How a frame runs
//!
//! 1. [`Scheduler::begin_frame`] opens a window `[now, now + dt]` and snapshots
//!    the frame requests made so far.
//! 2. [`Scheduler::next_due`] pops timers in `(due, seq)` order, moving `now`
//!    to each timer's due time. Timers scheduled while dispatching are picked
//!    up in the same window if they fall inside it.
//! 3. [`Scheduler::take_frame_callbacks`] closes the window (`now = end`) and
//!    returns the snapshotted frame requests. Requests made during those
//!    callbacks wait for the next frame.
//!
//! # Invariants
//!
//! 1. Tasks fire in non-decreasing due time; ties fire in scheduling order.
//! 2. A cancelled handle never fires, even if it was already due.
//! 3. An interval re-arms at `due + period` after firing, keeping its handle.
//! 4. [`Scheduler::clear`] leaves `pending() == 0`.
//!
//! # Failure Modes
//!
//! - Zero-period intervals are clamped to [`MIN_INTERVAL`] so a frame window
//!   always terminates.
//! - Cancelling an unknown or already-fired handle is a no-op returning `false`.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Shortest allowed interval period.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Handle to a scheduled timeout, interval, or frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// Raw numeric value (for logging).
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// What kind of callback a handle refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    Timeout,
    Interval(Duration),
    Frame,
}

#[derive(Debug, Clone)]
struct TimerEntry<T> {
    id: TimerId,
    kind: TimerKind,
    task: T,
}

/// Pending-callback counts, split by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingCounts {
    pub timeouts: usize,
    pub intervals: usize,
    pub frames: usize,
}

impl PendingCounts {
    #[inline]
    pub fn total(&self) -> usize {
        self.timeouts + self.intervals + self.frames
    }
}

/// Owner of all pending callbacks for one run.
#[derive(Debug)]
pub struct Scheduler<T> {
    now: Duration,
    /// End of the frame window opened by `begin_frame`.
    horizon: Duration,
    next_id: u64,
    next_seq: u64,
    /// Timers keyed by `(due, seq)`.
    timers: BTreeMap<(Duration, u64), TimerEntry<T>>,
    /// Handle → timer key, for cancellation.
    index: HashMap<TimerId, (Duration, u64)>,
    /// Frame requests waiting for the next frame.
    frames: Vec<(TimerId, T)>,
    /// Frame requests snapshotted for the current frame.
    frame_batch: Vec<(TimerId, T)>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    /// Create an empty scheduler at time zero.
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            horizon: Duration::ZERO,
            next_id: 1,
            next_seq: 0,
            timers: BTreeMap::new(),
            index: HashMap::new(),
            frames: Vec::new(),
            frame_batch: Vec::new(),
        }
    }

    /// Current virtual time.
    #[inline]
    pub fn now(&self) -> Duration {
        self.now
    }

    fn alloc_id(&mut self) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        id
    }

    fn insert_timer(&mut self, due: Duration, entry: TimerEntry<T>) {
        let key = (due, self.next_seq);
        self.next_seq += 1;
        self.index.insert(entry.id, key);
        self.timers.insert(key, entry);
    }

    /// Run `task` once after `delay`.
    pub fn set_timeout(&mut self, delay: Duration, task: T) -> TimerId {
        let id = self.alloc_id();
        let due = self.now.saturating_add(delay);
        self.insert_timer(
            due,
            TimerEntry {
                id,
                kind: TimerKind::Timeout,
                task,
            },
        );
        id
    }

    /// Run `task` every `period` until cancelled. The first run is one period
    /// from now.
    pub fn set_interval(&mut self, period: Duration, task: T) -> TimerId {
        let period = period.max(MIN_INTERVAL);
        let id = self.alloc_id();
        let due = self.now.saturating_add(period);
        self.insert_timer(
            due,
            TimerEntry {
                id,
                kind: TimerKind::Interval(period),
                task,
            },
        );
        id
    }

    /// Run `task` at the end of the next frame.
    pub fn request_frame(&mut self, task: T) -> TimerId {
        let id = self.alloc_id();
        self.frames.push((id, task));
        id
    }

    /// Cancel a pending handle. Returns `true` if something was removed.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        if let Some(key) = self.index.remove(&id) {
            self.timers.remove(&key);
            return true;
        }
        if let Some(pos) = self.frames.iter().position(|(fid, _)| *fid == id) {
            self.frames.remove(pos);
            return true;
        }
        if let Some(pos) = self.frame_batch.iter().position(|(fid, _)| *fid == id) {
            self.frame_batch.remove(pos);
            return true;
        }
        false
    }

    /// Whether a handle is still pending.
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.index.contains_key(&id)
            || self.frames.iter().any(|(fid, _)| *fid == id)
            || self.frame_batch.iter().any(|(fid, _)| *fid == id)
    }

    /// Open a frame window of length `dt`.
    ///
    /// Frame requests made before this call run at the end of this frame.
    pub fn begin_frame(&mut self, dt: Duration) {
        self.horizon = self.now.saturating_add(dt);
        let mut queued = std::mem::take(&mut self.frames);
        self.frame_batch.append(&mut queued);
    }

    /// Close the frame window and hand back this frame's animation callbacks.
    pub fn take_frame_callbacks(&mut self) -> Vec<(TimerId, T)> {
        if self.horizon > self.now {
            self.now = self.horizon;
        }
        std::mem::take(&mut self.frame_batch)
    }

    /// Number of pending callbacks of every kind.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending_counts().total()
    }

    /// Pending callbacks split by kind.
    #[must_use]
    pub fn pending_counts(&self) -> PendingCounts {
        let mut counts = PendingCounts {
            frames: self.frames.len() + self.frame_batch.len(),
            ..PendingCounts::default()
        };
        for entry in self.timers.values() {
            match entry.kind {
                TimerKind::Timeout => counts.timeouts += 1,
                TimerKind::Interval(_) => counts.intervals += 1,
                TimerKind::Frame => counts.frames += 1,
            }
        }
        counts
    }

    /// Drop every pending callback. Returns how many were cancelled.
    ///
    /// Virtual time is preserved so handles never repeat.
    pub fn clear(&mut self) -> usize {
        let cancelled = self.pending();
        self.timers.clear();
        self.index.clear();
        self.frames.clear();
        self.frame_batch.clear();
        cancelled
    }
}

impl<T: Clone> Scheduler<T> {
    /// Pop the next timer due inside the current frame window.
    ///
    /// Advances `now` to the timer's due time. Intervals are re-armed before
    /// their task is returned, so the caller may cancel them while handling it.
    pub fn next_due(&mut self) -> Option<(TimerId, T)> {
        let (&key, _) = self.timers.first_key_value()?;
        if key.0 > self.horizon {
            return None;
        }
        let entry = self.timers.remove(&key)?;
        self.index.remove(&entry.id);
        if key.0 > self.now {
            self.now = key.0;
        }
        if let TimerKind::Interval(period) = entry.kind {
            self.insert_timer(key.0.saturating_add(period), entry.clone());
        }
        Some((entry.id, entry.task))
    }
}
