#![forbid(unsafe_code)]

//! Runtime: the cooperative host loop the cinematic runs on.
//!
//! # Role in Ember Gate
//! A browser gives an animation `setTimeout`, `setInterval` and
//! `requestAnimationFrame`. `ember-runtime` gives the same three primitives in
//! virtual time, owned by one value so teardown is a single `clear()`.
//!
//! # Primary responsibilities
//! - **Scheduler**: ordered timeouts, re-arming intervals, frame requests.
//! - **FrameLoop**: a per-frame poll that stops itself when work runs out.
//! - **Driver**: advancing a scheduler one frame at a time and dispatching
//!   due tasks to a handler.

pub mod frame_loop;
pub mod scheduler;

pub use frame_loop::{FrameLoop, FrameLoopState};
pub use scheduler::{MIN_INTERVAL, PendingCounts, Scheduler, TimerId, TimerKind};

use std::time::Duration;

/// Receives tasks popped from a [`Scheduler`] during [`run_frame`].
pub trait Dispatch<T> {
    /// Handle a due timer or interval task.
    fn on_timer(&mut self, scheduler: &mut Scheduler<T>, id: TimerId, task: T);

    /// Handle an animation-frame task.
    fn on_frame(&mut self, scheduler: &mut Scheduler<T>, id: TimerId, task: T);
}

/// Advance `scheduler` by one frame of length `dt`, dispatching every due
/// timer in order and then this frame's animation callbacks.
///
/// Returns the number of tasks dispatched.
pub fn run_frame<T: Clone, D: Dispatch<T>>(
    scheduler: &mut Scheduler<T>,
    dt: Duration,
    handler: &mut D,
) -> usize {
    let mut dispatched = 0;
    scheduler.begin_frame(dt);
    while let Some((id, task)) = scheduler.next_due() {
        handler.on_timer(scheduler, id, task);
        dispatched += 1;
    }
    for (id, task) in scheduler.take_frame_callbacks() {
        handler.on_frame(scheduler, id, task);
        dispatched += 1;
    }
    tracing::trace!(dispatched, now_ms = scheduler.now().as_millis() as u64, "frame");
    dispatched
}
