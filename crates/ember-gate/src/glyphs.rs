#![forbid(unsafe_code)]

//! Glyph tables for scrambling and ash.

use rand::Rng;
#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

/// Non-breaking space: the rendered form of every blank character.
pub const BLANK: &str = "\u{00A0}";

/// Glyphs used for ash particles, brightest first.
pub const ASH_GLYPHS: &[char] = &['*', '+', '·', '.', '˙'];

const ALPHANUMERIC: &[char] = &[
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R',
    'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j',
    'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', '0', '1',
    '2', '3', '4', '5', '6', '7', '8', '9',
];

const UPPERCASE: &[char] = &[
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R',
    'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

const BINARY: &[char] = &['0', '1'];

const SYMBOLS: &[char] = &[
    '/', '\\', '|', '-', '+', '*', '#', '@', '=', '>', '<', '[', ']', '{', '}', '(', ')', '$',
    '%', '&', '!', '?', '^', '~',
];

const KATAKANA: &[char] = &[
    'ｱ', 'ｲ', 'ｳ', 'ｴ', 'ｵ', 'ｶ', 'ｷ', 'ｸ', 'ｹ', 'ｺ', 'ｻ', 'ｼ', 'ｽ', 'ｾ', 'ｿ', 'ﾀ', 'ﾁ', 'ﾂ',
    'ﾃ', 'ﾄ', 'ﾅ', 'ﾆ', 'ﾇ', 'ﾈ', 'ﾉ', 'ﾊ', 'ﾋ', 'ﾌ', 'ﾍ', 'ﾎ', 'ﾏ', 'ﾐ', 'ﾑ', 'ﾒ', 'ﾓ', 'ﾔ',
    'ﾕ', 'ﾖ', 'ﾗ', 'ﾘ', 'ﾙ', 'ﾚ', 'ﾛ', 'ﾜ', 'ﾝ',
];

const MATRIX: &[char] = &[
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'ｱ', 'ｲ', 'ｳ', 'ｴ', 'ｵ', 'ｶ', 'ｷ', 'ｸ',
    'ｹ', 'ｺ', 'ｻ', 'ｼ', 'ｽ', 'ｾ', 'ｿ', 'ﾀ', 'ﾁ', 'ﾂ', 'ﾃ', 'ﾄ', 'ﾅ', 'ﾆ', 'ﾇ', 'ﾈ', 'ﾉ', 'ﾊ',
    'ﾋ', 'ﾌ', 'ﾍ', 'ﾎ', 'ﾏ', 'ﾐ', 'ﾑ', 'ﾒ', 'ﾓ', 'ﾔ', 'ﾕ', 'ﾖ', 'ﾗ', 'ﾘ', 'ﾙ', 'ﾚ', 'ﾛ', 'ﾜ',
    'ﾝ', 'A', 'B', 'C', 'D', 'E', 'F', 'Z',
];

/// Character set the scramble draws placeholder glyphs from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "kebab-case"))]
pub enum GlyphSet {
    #[default]
    Alphanumeric,
    Uppercase,
    Binary,
    Symbols,
    /// Half-width katakana.
    Katakana,
    /// Katakana, digits and a few capitals.
    Matrix,
    /// Any characters; whitespace is ignored. An empty set falls back to
    /// [`GlyphSet::Alphanumeric`].
    Custom(String),
}

impl GlyphSet {
    /// Look up a named set (`"alphanumeric"`, `"binary"`, ...). Anything else
    /// is treated as a custom character list.
    pub fn named_or_custom(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "alphanumeric" => Self::Alphanumeric,
            "uppercase" => Self::Uppercase,
            "binary" => Self::Binary,
            "symbols" => Self::Symbols,
            "katakana" => Self::Katakana,
            "matrix" => Self::Matrix,
            _ => Self::Custom(name.to_string()),
        }
    }

    /// Resolve to a concrete, non-empty glyph table.
    pub fn table(&self) -> GlyphTable {
        let chars = match self {
            Self::Alphanumeric => ALPHANUMERIC.to_vec(),
            Self::Uppercase => UPPERCASE.to_vec(),
            Self::Binary => BINARY.to_vec(),
            Self::Symbols => SYMBOLS.to_vec(),
            Self::Katakana => KATAKANA.to_vec(),
            Self::Matrix => MATRIX.to_vec(),
            Self::Custom(s) => s.chars().filter(|c| !c.is_whitespace()).collect(),
        };
        if chars.is_empty() {
            GlyphTable {
                chars: ALPHANUMERIC.to_vec(),
            }
        } else {
            GlyphTable { chars }
        }
    }

    /// True for a custom set with no usable characters.
    pub fn is_empty_custom(&self) -> bool {
        matches!(self, Self::Custom(s) if s.chars().all(char::is_whitespace))
    }
}

/// A resolved, non-empty list of glyphs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphTable {
    chars: Vec<char>,
}

impl GlyphTable {
    /// Draw a glyph uniformly at random.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> char {
        self.chars[rng.random_range(0..self.chars.len())]
    }

    pub fn contains(&self, c: char) -> bool {
        self.chars.contains(&c)
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

/// Pick an ash glyph.
pub fn ash_glyph<R: Rng + ?Sized>(rng: &mut R) -> char {
    ASH_GLYPHS[rng.random_range(0..ASH_GLYPHS.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn named_lookup_is_case_insensitive() {
        assert_eq!(GlyphSet::named_or_custom(" Binary "), GlyphSet::Binary);
        assert_eq!(
            GlyphSet::named_or_custom("xyz"),
            GlyphSet::Custom("xyz".into())
        );
    }

    #[test]
    fn custom_set_ignores_whitespace() {
        let table = GlyphSet::Custom("a b\tc".into()).table();
        assert_eq!(table.len(), 3);
        assert!(!table.contains(' '));
    }

    #[test]
    fn empty_custom_falls_back() {
        let set = GlyphSet::Custom("   ".into());
        assert!(set.is_empty_custom());
        assert_eq!(set.table(), GlyphSet::Alphanumeric.table());
    }

    #[test]
    fn picks_stay_in_table() {
        let mut rng = SmallRng::seed_from_u64(7);
        let table = GlyphSet::Katakana.table();
        for _ in 0..200 {
            assert!(table.contains(table.pick(&mut rng)));
        }
        assert!(ASH_GLYPHS.contains(&ash_glyph(&mut rng)));
    }
}
