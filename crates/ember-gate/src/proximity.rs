#![forbid(unsafe_code)]

//! Per-frame proximity between the lead ember and unclaimed units.
//!
//! Each frame the tracker reads the lead ember's horizontal center and claims
//! every unprocessed, non-blank unit whose own center is closer than the
//! threshold. Claimed units are marked [`Markers::HOT`] and get a dissolve
//! scheduled after the ignite delay.
//!
//! # Invariants
//!
//! 1. At most one frame request is outstanding.
//! 2. After the poll that claims the last unit, no further frame is
//!    requested.
//! 3. Units are scanned in arena order (scatter phrase, then scramble phrase,
//!    index ascending); every unit in range is claimed in the same frame.

use std::time::Duration;

use ember_runtime::{FrameLoop, Scheduler, TimerId};
use tracing::{debug, trace};

use crate::surface::{Markers, NodeId, Surface};
use crate::unit::UnitArena;

/// Horizontal center of the lead ember, if it is on the surface.
pub fn ember_x<S: Surface + ?Sized>(surface: &S, lead: NodeId) -> Option<f64> {
    if !surface.is_attached(lead) {
        return None;
    }
    surface.bounds(lead).map(|b| b.center_x())
}

/// The self-terminating proximity loop.
#[derive(Debug, Clone)]
pub struct ProximityTracker {
    frame_loop: FrameLoop,
    threshold: f64,
    ignite_delay: Duration,
}

impl ProximityTracker {
    pub fn new(threshold: f64, ignite_delay: Duration) -> Self {
        Self {
            frame_loop: FrameLoop::new(),
            threshold,
            ignite_delay,
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.frame_loop.is_scheduled()
    }

    /// Request the first poll if any unit is still unclaimed.
    pub fn start<T>(&mut self, scheduler: &mut Scheduler<T>, arena: &UnitArena, task: T) -> bool {
        self.frame_loop.schedule(scheduler, arena.remaining(), task)
    }

    /// Handle a frame callback.
    ///
    /// Returns the arena positions claimed this frame, or `None` for a stale
    /// frame handle. `dissolve(pos)` builds the delayed dissolve task and
    /// `task` the next poll.
    #[allow(clippy::too_many_arguments)]
    pub fn poll<S: Surface + ?Sized, T>(
        &mut self,
        id: TimerId,
        scheduler: &mut Scheduler<T>,
        arena: &mut UnitArena,
        surface: &mut S,
        lead: NodeId,
        dissolve: impl Fn(usize) -> T,
        task: T,
    ) -> Option<Vec<usize>> {
        if !self.frame_loop.on_frame(id) {
            return None;
        }
        let mut claimed = Vec::new();
        if let Some(x) = ember_x(surface, lead) {
            for pos in 0..arena.len() {
                let Some(unit) = arena.get(pos) else {
                    continue;
                };
                if unit.is_processed() {
                    continue;
                }
                let Some(node) = unit.node() else {
                    continue;
                };
                let Some(bounds) = surface.bounds(node) else {
                    continue;
                };
                if (bounds.center_x() - x).abs() >= self.threshold {
                    continue;
                }
                if arena.claim(pos).is_ok() {
                    surface.insert_markers(node, Markers::HOT);
                    scheduler.set_timeout(self.ignite_delay, dissolve(pos));
                    claimed.push(pos);
                }
            }
            trace!(
                frame = self.frame_loop.frames_run(),
                ember_x = x,
                remaining = arena.remaining(),
                "proximity poll"
            );
        }
        if !claimed.is_empty() {
            debug!(?claimed, remaining = arena.remaining(), "units ignited");
        }
        self.frame_loop.schedule(scheduler, arena.remaining(), task);
        Some(claimed)
    }

    /// Cancel the outstanding frame request, if any.
    pub fn cancel<T>(&mut self, scheduler: &mut Scheduler<T>) {
        self.frame_loop.cancel(scheduler);
    }
}
