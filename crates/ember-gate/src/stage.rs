#![forbid(unsafe_code)]

//! In-memory [`Surface`]: a small retained node tree with layout and tweens.
//!
//! The stage knows three kinds of node:
//!
//! - **Frames** have an explicit screen-space box (the panel, the text
//!   containers, the emitter container).
//! - **Glyphs** flow left to right inside their parent frame, one fixed-size
//!   cell each. A line holds as many cells as fit the frame's width and the
//!   rest wrap onto further lines; each line is centered, and the block of
//!   lines is centered vertically on the frame.
//! - **Sprites** sit at an explicit point inside their parent frame (embers
//!   and ash particles).
//!
//! Every node's box is then moved, scaled and faded by its [`NodeStyle`].
//!
//! # Frame order
//!
//! The host calls [`Stage::advance`] once per frame before handing the stage
//! to the gate, so the gate always reads poses that include this frame's
//! tween progress.

use std::collections::BTreeMap;
use std::time::Duration;

use ember_core::animation::{ActiveTween, NodeStyle, Tween, TweenStep};
use ember_core::geometry::{BoxF, PointF, SizeF};

use crate::controller::GateSequence;
use crate::readiness::Anchor;
use crate::surface::{Markers, NodeId, ParticleSpec, Surface};

/// Default glyph cell size in stage pixels.
pub const DEFAULT_CELL: SizeF = SizeF {
    width: 16.0,
    height: 24.0,
};

/// What a node is and how it is laid out.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Explicitly placed box.
    Frame(BoxF),
    /// One cell of inline text.
    Glyph(String),
    /// A single character centered on a point inside the parent.
    Sprite { glyph: char, origin: PointF },
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
    style: NodeStyle,
    markers: Markers,
    attached: bool,
}

/// Read-only view of one node, for painting.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeView<'a> {
    pub id: NodeId,
    pub kind: &'a NodeKind,
    pub bounds: BoxF,
    pub style: NodeStyle,
    pub markers: Markers,
}

/// The in-memory render surface.
#[derive(Debug, Clone)]
pub struct Stage {
    cell: SizeF,
    next_id: u32,
    nodes: BTreeMap<NodeId, Node>,
    tweens: Vec<(NodeId, ActiveTween)>,
}

impl Default for Stage {
    fn default() -> Self {
        Self::new(DEFAULT_CELL)
    }
}

impl Stage {
    /// Create an empty stage whose glyphs occupy `cell`-sized boxes.
    pub fn new(cell: SizeF) -> Self {
        Self {
            cell,
            next_id: 1,
            nodes: BTreeMap::new(),
            tweens: Vec::new(),
        }
    }

    #[inline]
    pub fn cell(&self) -> SizeF {
        self.cell
    }

    fn insert(&mut self, parent: Option<NodeId>, kind: NodeKind) -> Option<NodeId> {
        if let Some(p) = parent {
            if !self.nodes.contains_key(&p) {
                return None;
            }
        }
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            Node {
                parent,
                children: Vec::new(),
                kind,
                style: NodeStyle::REST,
                markers: Markers::NONE,
                attached: true,
            },
        );
        if let Some(p) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            p.children.push(id);
        }
        Some(id)
    }

    /// Add a frame. Root frames pass `None` as parent.
    pub fn add_frame(&mut self, parent: Option<NodeId>, bounds: BoxF) -> Option<NodeId> {
        self.insert(parent, NodeKind::Frame(bounds))
    }

    /// Add a sprite centered on `origin` inside `parent`.
    pub fn add_sprite(&mut self, parent: NodeId, glyph: char, origin: PointF) -> Option<NodeId> {
        self.insert(Some(parent), NodeKind::Sprite { glyph, origin })
    }

    /// Detach a node (and so its subtree) from the visible tree.
    pub fn detach(&mut self, node: NodeId) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.attached = false;
        }
    }

    /// Re-attach a detached node.
    pub fn attach(&mut self, node: NodeId) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.attached = true;
        }
    }

    /// Remove a node and its subtree.
    pub fn remove(&mut self, node: NodeId) -> usize {
        let Some(n) = self.nodes.remove(&node) else {
            return 0;
        };
        if let Some(p) = n.parent.and_then(|p| self.nodes.get_mut(&p)) {
            p.children.retain(|c| *c != node);
        }
        self.tweens.retain(|(id, _)| *id != node);
        let mut removed = 1;
        for child in n.children {
            removed += self.remove(child);
        }
        removed
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    pub fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.nodes.get(&node).map(|n| &n.kind)
    }

    /// Text of a glyph node.
    pub fn glyph(&self, node: NodeId) -> Option<&str> {
        match self.kind(node)? {
            NodeKind::Glyph(text) => Some(text),
            _ => None,
        }
    }

    /// Concatenated text of `node`'s glyph children.
    pub fn text(&self, node: NodeId) -> String {
        self.children(node)
            .into_iter()
            .filter_map(|c| self.glyph(c))
            .collect()
    }

    /// Total number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of running tweens.
    pub fn tween_count(&self) -> usize {
        self.tweens.len()
    }

    /// Whether `node` has a running tween.
    pub fn is_animating(&self, node: NodeId) -> bool {
        self.tweens.iter().any(|(id, _)| *id == node)
    }

    /// Every attached node in creation order.
    pub fn views(&self) -> impl Iterator<Item = NodeView<'_>> {
        self.nodes.iter().filter_map(|(&id, n)| {
            if !self.is_attached(id) {
                return None;
            }
            Some(NodeView {
                id,
                kind: &n.kind,
                bounds: self.bounds(id)?,
                style: n.style,
                markers: n.markers,
            })
        })
    }

    /// Step every tween by `dt`. Nodes whose finished tween asks for it are
    /// removed. Returns the number of tweens that finished.
    pub fn advance(&mut self, dt: Duration) -> usize {
        let mut finished = 0;
        let mut doomed = Vec::new();
        let nodes = &mut self.nodes;
        self.tweens.retain_mut(|(id, tween)| {
            let Some(node) = nodes.get_mut(id) else {
                return false;
            };
            match tween.advance(dt, node.style) {
                TweenStep::Waiting => true,
                TweenStep::Running(style) => {
                    node.style = style;
                    true
                }
                TweenStep::Finished(style) => {
                    node.style = style;
                    finished += 1;
                    if tween.tween().remove_on_complete {
                        doomed.push(*id);
                    }
                    false
                }
            }
        });
        for id in doomed {
            self.remove(id);
        }
        finished
    }

    /// Glyph cells that fit on one line of a frame `width` wide (at least one).
    pub fn per_line(&self, width: f64) -> usize {
        let fit = (width / self.cell.width).floor();
        if fit.is_finite() && fit >= 1.0 {
            fit as usize
        } else {
            1
        }
    }

    /// Laid-out box before the node's own pose is applied.
    fn layout_box(&self, id: NodeId) -> Option<BoxF> {
        let node = self.nodes.get(&id)?;
        match &node.kind {
            NodeKind::Frame(b) => Some(*b),
            NodeKind::Glyph(_) => {
                let parent_id = node.parent?;
                let parent = self.nodes.get(&parent_id)?;
                let frame = self.bounds(parent_id)?;
                let line: Vec<NodeId> = parent
                    .children
                    .iter()
                    .copied()
                    .filter(|c| matches!(self.kind(*c), Some(NodeKind::Glyph(_))))
                    .collect();
                let k = line.iter().position(|c| *c == id)?;
                let (row, col, row_len, rows) = wrap_slot(k, line.len(), self.per_line(frame.width));
                let row_width = row_len as f64 * self.cell.width;
                let block_height = rows as f64 * self.cell.height;
                let x = frame.x + (frame.width - row_width) / 2.0 + col as f64 * self.cell.width;
                let y = frame.y + (frame.height - block_height) / 2.0 + row as f64 * self.cell.height;
                Some(BoxF::new(x, y, self.cell.width, self.cell.height))
            }
            NodeKind::Sprite { origin, .. } => {
                let frame = self.bounds(node.parent?)?;
                Some(BoxF::new(
                    frame.x + origin.x - self.cell.width / 2.0,
                    frame.y + origin.y - self.cell.height / 2.0,
                    self.cell.width,
                    self.cell.height,
                ))
            }
        }
    }
}

/// `(row, column, cells in that row, rows)` of glyph `k` out of `n` when
/// lines hold `per_line` cells.
fn wrap_slot(k: usize, n: usize, per_line: usize) -> (usize, usize, usize, usize) {
    let per_line = per_line.max(1);
    let rows = n.div_ceil(per_line);
    let row = k / per_line;
    let row_len = (n - row * per_line).min(per_line);
    (row, k % per_line, row_len, rows)
}

/// Node ids of a standard gate layout built by [`Stage::gate_layout`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateLayout {
    pub panel: NodeId,
    pub scatter_text: NodeId,
    pub scramble_text: NodeId,
    pub emitter: NodeId,
    /// Ember sprites; the first is marked lead.
    pub embers: Vec<NodeId>,
}

impl GateLayout {
    /// Fill every anchor slot of `gate`.
    pub fn attach_to(&self, gate: &mut GateSequence) {
        gate.attach(Anchor::Panel, self.panel);
        gate.attach(Anchor::ScatterText, self.scatter_text);
        gate.attach(Anchor::ScrambleText, self.scramble_text);
        gate.attach(Anchor::Emitter, self.emitter);
    }
}

impl Stage {
    /// Lay out a panel with the scatter line in its upper third, the scramble
    /// line below it, and an emitter covering the panel with `embers` sprites
    /// parked on its left edge.
    pub fn gate_layout(&mut self, panel: BoxF, embers: usize) -> Option<GateLayout> {
        let line_h = self.cell.height;
        let panel_id = self.add_frame(None, panel)?;
        let scatter_text = self.add_frame(
            Some(panel_id),
            BoxF::new(panel.x, panel.y + panel.height / 3.0 - line_h, panel.width, line_h),
        )?;
        let scramble_text = self.add_frame(
            Some(panel_id),
            BoxF::new(panel.x, panel.y + panel.height * 2.0 / 3.0, panel.width, line_h),
        )?;
        let emitter = self.add_frame(Some(panel_id), panel)?;
        let mut sprites = Vec::with_capacity(embers);
        for i in 0..embers {
            let id = self.add_sprite(emitter, '●', PointF::new(0.0, panel.height / 2.0))?;
            if i == 0 {
                self.insert_markers(id, Markers::LEAD);
            }
            sprites.push(id);
        }
        Some(GateLayout {
            panel: panel_id,
            scatter_text,
            scramble_text,
            emitter,
            embers: sprites,
        })
    }
}

impl Surface for Stage {
    fn is_attached(&self, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            match self.nodes.get(&id) {
                Some(n) if n.attached => cursor = n.parent,
                _ => return false,
            }
        }
        true
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(&node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn bounds(&self, node: NodeId) -> Option<BoxF> {
        let style = self.nodes.get(&node)?.style;
        let laid_out = self.layout_box(node)?;
        Some(
            laid_out
                .translate(style.dx, style.dy)
                .scale_about_center(style.scale),
        )
    }

    fn style(&self, node: NodeId) -> Option<NodeStyle> {
        self.nodes.get(&node).map(|n| n.style)
    }

    fn set_style(&mut self, node: NodeId, style: NodeStyle) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.style = style.clamped();
        }
    }

    fn markers(&self, node: NodeId) -> Markers {
        self.nodes.get(&node).map_or(Markers::NONE, |n| n.markers)
    }

    fn set_markers(&mut self, node: NodeId, markers: Markers) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.markers = markers;
        }
    }

    fn append_glyph(&mut self, parent: NodeId, glyph: &str, style: NodeStyle) -> Option<NodeId> {
        let id = self.insert(Some(parent), NodeKind::Glyph(glyph.to_string()))?;
        self.set_style(id, style);
        Some(id)
    }

    fn set_glyph(&mut self, node: NodeId, glyph: &str) {
        if let Some(Node {
            kind: NodeKind::Glyph(text),
            ..
        }) = self.nodes.get_mut(&node)
        {
            text.clear();
            text.push_str(glyph);
        }
    }

    fn animate(&mut self, node: NodeId, tween: Tween) {
        if !self.nodes.contains_key(&node) {
            return;
        }
        self.tweens.retain(|(id, _)| *id != node);
        self.tweens.push((node, ActiveTween::new(tween)));
    }

    fn stop_animations(&mut self, node: NodeId) {
        self.tweens.retain(|(id, _)| *id != node);
    }

    fn spawn_particle(&mut self, parent: NodeId, spec: &ParticleSpec) -> Option<NodeId> {
        let id = self.add_sprite(parent, spec.glyph, spec.origin)?;
        self.animate(id, spec.tween());
        Some(id)
    }

    fn clear_children(&mut self, node: NodeId) -> usize {
        self.children(node)
            .into_iter()
            .map(|child| self.remove(child))
            .sum()
    }
}
