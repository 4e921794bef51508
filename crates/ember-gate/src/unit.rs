#![forbid(unsafe_code)]

//! Character units and the arena that owns them for one run.
//!
//! # Invariants
//!
//! 1. `processed` and `dissolved` only ever go `false → true`.
//! 2. A unit is dissolved only after it was processed:
//!    `processed → dissolve scheduled → dissolved`.
//! 3. Blank units are created processed and dissolved and never change.
//! 4. Both flags are mutated only through [`UnitArena::claim`] and
//!    [`UnitArena::mark_dissolved`], so the arena's counters always agree
//!    with the flags.

use crate::glyphs::BLANK;
use crate::surface::NodeId;

/// How a unit enters the stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitRole {
    /// Flies in from a scattered offset.
    StaticScatter,
    /// Decodes from scrambled glyphs.
    ScrambleReveal,
}

/// One rendered glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterUnit {
    /// Position in the source phrase.
    pub index: usize,
    /// The true glyph (`BLANK` for whitespace).
    pub final_glyph: String,
    /// What is displayed right now.
    pub current_glyph: String,
    pub role: UnitRole,
    pub(crate) processed: bool,
    pub(crate) dissolved: bool,
    /// Render node, once the unit is on a surface.
    pub(crate) node: Option<NodeId>,
}

impl CharacterUnit {
    pub(crate) fn new(index: usize, final_glyph: String, current_glyph: String, role: UnitRole) -> Self {
        let blank = final_glyph == BLANK;
        Self {
            index,
            final_glyph,
            current_glyph,
            role,
            processed: blank,
            dissolved: blank,
            node: None,
        }
    }

    /// Whitespace unit: rendered as a non-breaking blank, never animated.
    #[inline]
    pub fn is_blank(&self) -> bool {
        self.final_glyph == BLANK
    }

    #[inline]
    pub fn is_processed(&self) -> bool {
        self.processed
    }

    #[inline]
    pub fn is_dissolved(&self) -> bool {
        self.dissolved
    }

    #[inline]
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// True once the displayed glyph is the final one.
    #[inline]
    pub fn is_revealed(&self) -> bool {
        self.current_glyph == self.final_glyph
    }
}

/// Which phrase a unit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    Scatter,
    Scramble,
}

/// Why a claim or dissolve was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitRejection {
    /// No unit at that arena position.
    OutOfRange,
    /// Blank units never take part.
    Blank,
    /// Already claimed (for `claim`) or already dissolved (for `mark_dissolved`).
    AlreadyDone,
    /// `mark_dissolved` on a unit that was never claimed.
    NotProcessed,
}

/// All units of one run, indexed by arena position.
///
/// Scatter-phrase units come first, then scramble-phrase units.
#[derive(Debug, Clone, Default)]
pub struct UnitArena {
    units: Vec<CharacterUnit>,
    scatter_len: usize,
    active_total: usize,
    processed: usize,
    dissolved: usize,
}

impl UnitArena {
    /// Build the arena from the two phrases' units.
    pub fn new(scatter: Vec<CharacterUnit>, scramble: Vec<CharacterUnit>) -> Self {
        let scatter_len = scatter.len();
        let mut units = scatter;
        units.extend(scramble);
        let active_total = units.iter().filter(|u| !u.is_blank()).count();
        Self {
            units,
            scatter_len,
            active_total,
            processed: 0,
            dissolved: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    #[inline]
    pub fn get(&self, pos: usize) -> Option<&CharacterUnit> {
        self.units.get(pos)
    }

    pub(crate) fn get_mut(&mut self, pos: usize) -> Option<&mut CharacterUnit> {
        self.units.get_mut(pos)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CharacterUnit> {
        self.units.iter()
    }

    /// Arena positions of one phrase.
    pub fn segment(&self, segment: Segment) -> std::ops::Range<usize> {
        match segment {
            Segment::Scatter => 0..self.scatter_len,
            Segment::Scramble => self.scatter_len..self.units.len(),
        }
    }

    /// Units of one phrase.
    pub fn segment_units(&self, segment: Segment) -> &[CharacterUnit] {
        &self.units[self.segment(segment)]
    }

    /// Non-blank units across both phrases.
    #[inline]
    pub fn active_total(&self) -> usize {
        self.active_total
    }

    /// Non-blank units not yet claimed.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.active_total - self.processed
    }

    #[inline]
    pub fn processed_count(&self) -> usize {
        self.processed
    }

    #[inline]
    pub fn dissolved_count(&self) -> usize {
        self.dissolved
    }

    /// True exactly when every non-blank unit has dissolved.
    #[inline]
    pub fn all_dissolved(&self) -> bool {
        self.dissolved == self.active_total
    }

    /// Claim a unit for ignition: `processed = true`.
    pub fn claim(&mut self, pos: usize) -> Result<(), UnitRejection> {
        let unit = self.units.get_mut(pos).ok_or(UnitRejection::OutOfRange)?;
        if unit.is_blank() {
            return Err(UnitRejection::Blank);
        }
        if unit.processed {
            return Err(UnitRejection::AlreadyDone);
        }
        unit.processed = true;
        self.processed += 1;
        Ok(())
    }

    /// Record that a claimed unit has dissolved: `dissolved = true`.
    pub fn mark_dissolved(&mut self, pos: usize) -> Result<(), UnitRejection> {
        let unit = self.units.get_mut(pos).ok_or(UnitRejection::OutOfRange)?;
        if unit.is_blank() {
            return Err(UnitRejection::Blank);
        }
        if unit.dissolved {
            return Err(UnitRejection::AlreadyDone);
        }
        if !unit.processed {
            return Err(UnitRejection::NotProcessed);
        }
        unit.dissolved = true;
        self.dissolved += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(i: usize, g: &str) -> CharacterUnit {
        CharacterUnit::new(i, g.to_string(), g.to_string(), UnitRole::StaticScatter)
    }

    fn arena() -> UnitArena {
        UnitArena::new(
            vec![unit(0, "a"), unit(1, BLANK), unit(2, "b")],
            vec![unit(0, "c")],
        )
    }

    #[test]
    fn blanks_start_finished() {
        let u = unit(0, BLANK);
        assert!(u.is_processed() && u.is_dissolved());
        assert_eq!(arena().active_total(), 3);
    }

    #[test]
    fn claim_is_once_only() {
        let mut a = arena();
        assert_eq!(a.claim(0), Ok(()));
        assert_eq!(a.claim(0), Err(UnitRejection::AlreadyDone));
        assert_eq!(a.claim(1), Err(UnitRejection::Blank));
        assert_eq!(a.claim(9), Err(UnitRejection::OutOfRange));
        assert_eq!(a.remaining(), 2);
    }

    #[test]
    fn dissolve_requires_claim() {
        let mut a = arena();
        assert_eq!(a.mark_dissolved(2), Err(UnitRejection::NotProcessed));
        a.claim(2).unwrap();
        assert_eq!(a.mark_dissolved(2), Ok(()));
        assert_eq!(a.mark_dissolved(2), Err(UnitRejection::AlreadyDone));
        assert_eq!(a.dissolved_count(), 1);
    }

    #[test]
    fn all_dissolved_is_exact() {
        let mut a = arena();
        for pos in [0, 2, 3] {
            assert!(!a.all_dissolved());
            a.claim(pos).unwrap();
            a.mark_dissolved(pos).unwrap();
        }
        assert!(a.all_dissolved());
    }

    #[test]
    fn segments_split_the_arena() {
        let a = arena();
        assert_eq!(a.segment(Segment::Scatter), 0..3);
        assert_eq!(a.segment(Segment::Scramble), 3..4);
        assert_eq!(a.segment_units(Segment::Scramble)[0].final_glyph, "c");
    }
}
