#![forbid(unsafe_code)]

//! Phrase → character units.
//!
//! A phrase is split into extended grapheme clusters so that combined
//! characters (accents, emoji sequences) stay one unit. Whitespace becomes a
//! [`BLANK`] unit that is born processed and dissolved.

use rand::Rng;
use unicode_segmentation::UnicodeSegmentation;

use crate::glyphs::{BLANK, GlyphTable};
use crate::unit::{CharacterUnit, UnitRole};

/// Builds [`CharacterUnit`]s for one phrase.
#[derive(Debug, Clone)]
pub struct CharacterFactory<'a> {
    glyphs: &'a GlyphTable,
}

impl<'a> CharacterFactory<'a> {
    /// Scrambled placeholders are drawn from `glyphs`.
    pub fn new(glyphs: &'a GlyphTable) -> Self {
        Self { glyphs }
    }

    /// Split `phrase` into units in source order.
    ///
    /// `StaticScatter` units display their final glyph from the start;
    /// `ScrambleReveal` units start on a random glyph from the table.
    pub fn build<R: Rng + ?Sized>(
        &self,
        phrase: &str,
        role: UnitRole,
        rng: &mut R,
    ) -> Vec<CharacterUnit> {
        phrase
            .graphemes(true)
            .enumerate()
            .map(|(index, g)| {
                if g.chars().all(char::is_whitespace) {
                    return CharacterUnit::new(index, BLANK.to_string(), BLANK.to_string(), role);
                }
                let current = match role {
                    UnitRole::StaticScatter => g.to_string(),
                    UnitRole::ScrambleReveal => self.glyphs.pick(rng).to_string(),
                };
                CharacterUnit::new(index, g.to_string(), current, role)
            })
            .collect()
    }
}

/// Number of units `phrase` produces.
pub fn unit_count(phrase: &str) -> usize {
    phrase.graphemes(true).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyphs::GlyphSet;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn keeps_order_and_blanks() {
        let table = GlyphSet::Alphanumeric.table();
        let mut rng = SmallRng::seed_from_u64(1);
        let units = CharacterFactory::new(&table).build("ab c", UnitRole::StaticScatter, &mut rng);
        let finals: Vec<&str> = units.iter().map(|u| u.final_glyph.as_str()).collect();
        assert_eq!(finals, ["a", "b", BLANK, "c"]);
        assert!(units[2].is_blank());
        assert!(units[2].is_processed() && units[2].is_dissolved());
        assert!(units.iter().all(|u| u.is_revealed()));
    }

    #[test]
    fn scramble_starts_from_table() {
        let table = GlyphSet::Binary.table();
        let mut rng = SmallRng::seed_from_u64(2);
        let units = CharacterFactory::new(&table).build("hi there", UnitRole::ScrambleReveal, &mut rng);
        for u in units.iter().filter(|u| !u.is_blank()) {
            assert!(u.current_glyph == "0" || u.current_glyph == "1");
            assert!(!u.is_processed());
        }
        assert_eq!(units[2].current_glyph, BLANK);
    }

    #[test]
    fn combining_marks_stay_together() {
        let table = GlyphSet::Alphanumeric.table();
        let mut rng = SmallRng::seed_from_u64(3);
        let units = CharacterFactory::new(&table).build("e\u{301}x", UnitRole::StaticScatter, &mut rng);
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].final_glyph, "e\u{301}");
        assert_eq!(unit_count("e\u{301}x"), 2);
    }
}
