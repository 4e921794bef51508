#![forbid(unsafe_code)]

//! Scramble decode: placeholder glyphs cycle until each unit locks.
//!
//! Each non-blank unit gets one interval that swaps its placeholder every
//! `speed`, and one timeout at `stagger * position + duration` that cancels
//! the interval and locks the unit to its final glyph. `position` is the
//! unit's place in the [`RevealOrder`].
//!
//! # Invariants
//!
//! 1. A unit has at most one live interval.
//! 2. A unit locks at most once; a lock for an already locked unit is refused.
//! 3. A lock scheduled for the same instant as an interval tick fires first,
//!    because every lock is scheduled before the interval re-arms.
//!
//! # Failure Modes
//!
//! - Blank units keep their slot in the order but are never scheduled.
//! - An empty phrase schedules nothing and reports a zero-length phase.

use std::time::Duration;

use ember_runtime::{Scheduler, TimerId};
use rand::Rng;
use rand::seq::SliceRandom;
#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::config::ScrambleConfig;
use crate::unit::CharacterUnit;

/// The order in which units lock to their final glyph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "kebab-case"))]
pub enum RevealOrder {
    /// Index ascending.
    #[default]
    Left,
    /// Index descending.
    Right,
    /// One shuffle per run.
    Random,
    /// Outward from `n / 2`, upper neighbour first.
    Center,
}

/// Unit indices of an `n`-unit phrase in reveal order.
///
/// `Center` on 11 units yields `5, 6, 4, 7, 3, 8, 2, 9, 1, 10, 0`.
pub fn reveal_order<R: Rng + ?Sized>(n: usize, order: RevealOrder, rng: &mut R) -> Vec<usize> {
    match order {
        RevealOrder::Left => (0..n).collect(),
        RevealOrder::Right => (0..n).rev().collect(),
        RevealOrder::Random => {
            let mut v: Vec<usize> = (0..n).collect();
            v.shuffle(rng);
            v
        }
        RevealOrder::Center => {
            let mut v = Vec::with_capacity(n);
            if n == 0 {
                return v;
            }
            let mid = n / 2;
            v.push(mid);
            let mut k = 1;
            while v.len() < n {
                if mid + k < n {
                    v.push(mid + k);
                }
                if k <= mid {
                    v.push(mid - k);
                }
                k += 1;
            }
            v
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    /// Blank, or not started yet.
    Idle,
    Cycling(TimerId),
    Locked,
}

/// Per-phrase scramble bookkeeping.
#[derive(Debug, Clone)]
pub struct ScrambleSequencer {
    order: Vec<usize>,
    slots: Vec<Slot>,
}

impl ScrambleSequencer {
    /// Plan the reveal order for `n` units.
    pub fn plan<R: Rng + ?Sized>(n: usize, order: RevealOrder, rng: &mut R) -> Self {
        Self {
            order: reveal_order(n, order, rng),
            slots: vec![Slot::Idle; n],
        }
    }

    /// Unit indices in the order they lock.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// When the unit at `index` locks, relative to the phase start.
    pub fn deadline(&self, index: usize, config: &ScrambleConfig) -> Option<Duration> {
        let position = self.order.iter().position(|&i| i == index)?;
        Some(lock_deadline(position, config))
    }

    /// Phase length for `units`: the latest lock deadline of a non-blank
    /// unit, or zero if every unit is blank.
    pub fn planned_total(&self, units: &[CharacterUnit], config: &ScrambleConfig) -> Duration {
        self.order
            .iter()
            .enumerate()
            .filter(|&(_, &index)| units.get(index).is_some_and(|u| !u.is_blank()))
            .map(|(position, _)| lock_deadline(position, config))
            .max()
            .unwrap_or(Duration::ZERO)
    }

    /// Schedule every non-blank unit's interval and lock.
    ///
    /// `tick(i)` and `lock(i)` build the scheduler task for unit `i`. Returns
    /// the phase length: the latest lock deadline, or zero if nothing was
    /// scheduled.
    pub fn start<T>(
        &mut self,
        scheduler: &mut Scheduler<T>,
        units: &[CharacterUnit],
        config: &ScrambleConfig,
        tick: impl Fn(usize) -> T,
        lock: impl Fn(usize) -> T,
    ) -> Duration {
        let mut total = Duration::ZERO;
        for (position, &index) in self.order.iter().enumerate() {
            let Some(unit) = units.get(index) else {
                continue;
            };
            if unit.is_blank() || self.slots[index] != Slot::Idle {
                continue;
            }
            let deadline = lock_deadline(position, config);
            scheduler.set_timeout(deadline, lock(index));
            let id = scheduler.set_interval(config.speed, tick(index));
            self.slots[index] = Slot::Cycling(id);
            total = total.max(deadline);
        }
        total
    }

    /// Whether the unit at `index` is still cycling placeholders.
    pub fn is_cycling(&self, index: usize) -> bool {
        matches!(self.slots.get(index), Some(Slot::Cycling(_)))
    }

    /// Stop the unit's interval and mark it locked.
    ///
    /// Returns `true` exactly once per unit; the caller then shows the final
    /// glyph.
    pub fn lock<T>(&mut self, scheduler: &mut Scheduler<T>, index: usize) -> bool {
        match self.slots.get(index).copied() {
            Some(Slot::Cycling(id)) => {
                scheduler.cancel(id);
                self.slots[index] = Slot::Locked;
                true
            }
            _ => false,
        }
    }
}

fn lock_deadline(position: usize, config: &ScrambleConfig) -> Duration {
    let position = u32::try_from(position).unwrap_or(u32::MAX);
    config
        .stagger
        .saturating_mul(position)
        .saturating_add(config.duration)
}
