//! Rasterize a [`Stage`] into terminal cells.
//!
//! One terminal cell covers one stage cell (`Stage::cell()` pixels). Each
//! visible glyph or sprite lands in the cell under its box center. Glyphs are
//! painted first, sprites (embers and ash) on top.

use std::io::{self, Write};

use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::{cursor, queue};
use ember_core::geometry::SizeF;
use ember_gate::glyphs::ASH_GLYPHS;
use ember_gate::stage::{NodeKind, NodeView};
use ember_gate::{Markers, Stage};
use unicode_width::UnicodeWidthChar;

/// Below this opacity a node is not painted at all.
const MIN_VISIBLE_OPACITY: f64 = 0.12;
/// Below this opacity a node is painted dimmed.
const DIM_OPACITY: f64 = 0.5;

/// How a painted cell is colored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tone {
    #[default]
    Empty,
    Text,
    Revealed,
    Hot,
    Dissolving,
    Ember,
    Ash,
    Dim,
}

impl Tone {
    fn color(self) -> Color {
        match self {
            Self::Empty | Self::Text => Color::White,
            Self::Revealed => Color::Cyan,
            Self::Hot => Color::Yellow,
            Self::Dissolving => Color::DarkRed,
            Self::Ember => Color::Rgb {
                r: 255,
                g: 140,
                b: 0,
            },
            Self::Ash => Color::Grey,
            Self::Dim => Color::DarkGrey,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    tone: Tone,
    /// Right half of a wide glyph painted in the previous column.
    continuation: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            tone: Tone::Empty,
            continuation: false,
        }
    }
}

/// A `cols × rows` grid of painted cells.
#[derive(Debug, Clone)]
pub struct Canvas {
    cols: u16,
    rows: u16,
    cells: Vec<Cell>,
}

impl Canvas {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            cells: vec![Cell::default(); usize::from(cols) * usize::from(rows)],
        }
    }

    pub fn size(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    /// Clear, then paint every visible node of `stage`.
    pub fn paint(&mut self, stage: &Stage) {
        self.clear();
        let cell = stage.cell();
        for view in stage.views() {
            if let NodeKind::Glyph(text) = view.kind {
                if let Some(ch) = text.chars().next() {
                    self.plot(&view, ch, cell);
                }
            }
        }
        for view in stage.views() {
            if let NodeKind::Sprite { glyph, .. } = view.kind {
                self.plot(&view, *glyph, cell);
            }
        }
    }

    /// Write a line of plain text (status bar, prompt) at `row`, clipped.
    pub fn label(&mut self, row: u16, col: u16, text: &str, tone: Tone) {
        if row >= self.rows {
            return;
        }
        let mut x = col;
        for ch in text.chars() {
            let width = ch.width().unwrap_or(0) as u16;
            if width == 0 {
                continue;
            }
            if x + width > self.cols {
                break;
            }
            self.put(x, row, ch, tone, width);
            x += width;
        }
    }

    /// The character at `(col, row)`, if in bounds.
    pub fn char_at(&self, col: u16, row: u16) -> Option<char> {
        self.index(col, row).map(|i| self.cells[i].ch)
    }

    pub fn tone_at(&self, col: u16, row: u16) -> Option<Tone> {
        self.index(col, row).map(|i| self.cells[i].tone)
    }

    /// Plain text of every row, trailing spaces trimmed.
    pub fn lines(&self) -> Vec<String> {
        (0..self.rows)
            .map(|row| {
                let line: String = self.row(row).filter(|c| !c.continuation).map(|c| c.ch).collect();
                line.trim_end().to_string()
            })
            .collect()
    }

    /// Queue the whole grid to `out`. The caller flushes.
    pub fn render<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let mut current = None;
        for row in 0..self.rows {
            queue!(out, cursor::MoveTo(0, row))?;
            for cell in self.row(row).filter(|c| !c.continuation) {
                let color = cell.tone.color();
                if current != Some(color) {
                    queue!(out, SetForegroundColor(color))?;
                    current = Some(color);
                }
                queue!(out, Print(cell.ch))?;
            }
        }
        queue!(out, ResetColor)
    }

    fn plot(&mut self, view: &NodeView<'_>, ch: char, cell: SizeF) {
        if view.style.opacity < MIN_VISIBLE_OPACITY || cell.width <= 0.0 || cell.height <= 0.0 {
            return;
        }
        let width = match ch.width() {
            Some(w) if w > 0 => w as u16,
            _ => return,
        };
        let center = view.bounds.center();
        let (col, row) = (center.x / cell.width, center.y / cell.height);
        if !(col >= 0.0 && row >= 0.0) {
            return;
        }
        let (col, row) = (col.floor() as u16, row.floor() as u16);
        if col.saturating_add(width) > self.cols || row >= self.rows {
            return;
        }
        self.put(col, row, ch, tone_for(view, ch), width);
    }

    fn put(&mut self, col: u16, row: u16, ch: char, tone: Tone, width: u16) {
        let Some(i) = self.index(col, row) else {
            return;
        };
        self.cells[i] = Cell {
            ch,
            tone,
            continuation: false,
        };
        if width == 2 {
            if let Some(j) = self.index(col + 1, row) {
                self.cells[j] = Cell {
                    ch: ' ',
                    tone,
                    continuation: true,
                };
            }
        }
    }

    fn row(&self, row: u16) -> impl Iterator<Item = &Cell> {
        let start = usize::from(row) * usize::from(self.cols);
        self.cells[start..start + usize::from(self.cols)].iter()
    }

    fn index(&self, col: u16, row: u16) -> Option<usize> {
        (col < self.cols && row < self.rows)
            .then(|| usize::from(row) * usize::from(self.cols) + usize::from(col))
    }
}

fn tone_for(view: &NodeView<'_>, ch: char) -> Tone {
    let tone = match view.kind {
        NodeKind::Sprite { .. } if ASH_GLYPHS.contains(&ch) => Tone::Ash,
        NodeKind::Sprite { .. } => Tone::Ember,
        _ if view.markers.contains(Markers::DISSOLVING) => Tone::Dissolving,
        _ if view.markers.contains(Markers::HOT) => Tone::Hot,
        _ if view.markers.contains(Markers::REVEALED) => Tone::Revealed,
        _ => Tone::Text,
    };
    if view.style.opacity < DIM_OPACITY && tone != Tone::Ember {
        Tone::Dim
    } else {
        tone
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::geometry::{BoxF, PointF};
    use ember_gate::Surface;
    use ember_core::animation::NodeStyle;

    fn stage_with_text(text: &str) -> (Stage, ember_gate::NodeId) {
        let mut stage = Stage::default();
        let frame = stage
            .add_frame(None, BoxF::new(0.0, 0.0, 16.0 * 20.0, 24.0))
            .unwrap();
        for g in text.chars() {
            stage
                .append_glyph(frame, &g.to_string(), NodeStyle::REST)
                .unwrap();
        }
        (stage, frame)
    }

    #[test]
    fn glyphs_land_in_their_cells() {
        let (stage, _) = stage_with_text("ab");
        let mut canvas = Canvas::new(20, 1);
        canvas.paint(&stage);
        // Two cells centered in twenty columns.
        assert_eq!(canvas.lines()[0], format!("{}ab", " ".repeat(9)));
        assert_eq!(canvas.tone_at(9, 0), Some(Tone::Text));
    }

    #[test]
    fn faint_nodes_are_skipped() {
        let (mut stage, frame) = stage_with_text("x");
        let id = stage.children(frame)[0];
        stage.set_style(id, NodeStyle::REST.with_opacity(0.05));
        let mut canvas = Canvas::new(20, 1);
        canvas.paint(&stage);
        assert_eq!(canvas.lines()[0], "");
    }

    #[test]
    fn sprites_paint_over_text() {
        let (mut stage, frame) = stage_with_text("ab");
        // Center of column 9 ("a").
        stage
            .add_sprite(frame, '●', PointF::new(9.0 * 16.0 + 8.0, 12.0))
            .unwrap();
        let mut canvas = Canvas::new(20, 1);
        canvas.paint(&stage);
        assert_eq!(canvas.char_at(9, 0), Some('●'));
        assert_eq!(canvas.tone_at(9, 0), Some(Tone::Ember));
    }

    #[test]
    fn markers_pick_the_tone() {
        let (mut stage, frame) = stage_with_text("a");
        let id = stage.children(frame)[0];
        stage.insert_markers(id, Markers::HOT);
        let mut canvas = Canvas::new(20, 1);
        canvas.paint(&stage);
        assert_eq!(canvas.tone_at(9, 0), Some(Tone::Hot));
    }

    #[test]
    fn labels_clip_and_skip_zero_width() {
        let mut canvas = Canvas::new(4, 1);
        canvas.label(0, 1, "e\u{0301}xyz", Tone::Dim);
        assert_eq!(canvas.lines()[0], " exy");
        canvas.label(5, 0, "ignored", Tone::Dim);
    }

    #[test]
    fn render_writes_every_row() {
        let mut canvas = Canvas::new(3, 2);
        canvas.label(1, 0, "ok", Tone::Text);
        let mut out = Vec::new();
        canvas.render(&mut out).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("ok"));
    }
}
