#![forbid(unsafe_code)]

//! The render surface the cinematic draws into.
//!
//! A [`Surface`] is a retained tree of nodes with screen-space bounds, a
//! per-node [`NodeStyle`] pose, marker flags, and a tween engine. The gate
//! only ever talks to this trait; [`Stage`](crate::stage::Stage) is the
//! in-memory implementation used by the terminal player and the tests.
//!
//! # Ownership
//!
//! Nodes the gate creates (glyphs, particles) belong to the surface. The gate
//! keeps only [`NodeId`] handles and removes its nodes again on teardown with
//! [`Surface::clear_children`]. Particles remove themselves when their tween
//! completes.

use bitflags::bitflags;
use ember_core::animation::{Easing, NodeStyle, Tween};
use ember_core::geometry::{BoxF, PointF};
use std::time::Duration;

/// Handle to a node on a [`Surface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Raw numeric value (for logging).
    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }
}

bitflags! {
    /// Visual state markers carried by a node.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Markers: u8 {
        /// No markers.
        const NONE       = 0b0000;
        /// Ignited by the ember, dissolve pending.
        const HOT        = 0b0001;
        /// Scramble locked to the final glyph.
        const REVEALED   = 0b0010;
        /// Fading out into ash.
        const DISSOLVING = 0b0100;
        /// The emitter sub-element whose position drives proximity.
        const LEAD       = 0b1000;
    }
}

impl Default for Markers {
    fn default() -> Self {
        Self::NONE
    }
}

/// One ash fragment.
///
/// `origin` is relative to the parent container's top-left corner. The
/// particle starts at rest there and drifts by `drift` while rotating by
/// `rotation`, shrinking to `scale` and fading out over `duration`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSpec {
    pub glyph: char,
    pub origin: PointF,
    pub drift: PointF,
    pub rotation: f64,
    pub scale: f64,
    pub duration: Duration,
}

impl ParticleSpec {
    /// Pose the particle ends in.
    pub fn end_style(&self) -> NodeStyle {
        NodeStyle {
            dx: self.drift.x,
            dy: self.drift.y,
            rotation: self.rotation,
            scale: self.scale,
            opacity: 0.0,
        }
    }

    /// The self-removing tween that carries the particle to its end pose.
    pub fn tween(&self) -> Tween {
        Tween::to(self.end_style(), self.duration)
            .from(NodeStyle::REST)
            .easing(Easing::EaseOutQuad)
            .remove_on_complete()
    }
}

/// A retained node tree the gate can read geometry from and mutate.
pub trait Surface {
    /// Whether `node` exists and is attached to the visible tree.
    fn is_attached(&self, node: NodeId) -> bool;

    /// Children of `node` in layout order. Empty for unknown nodes.
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Screen-space bounding box, including the node's current pose.
    fn bounds(&self, node: NodeId) -> Option<BoxF>;

    fn style(&self, node: NodeId) -> Option<NodeStyle>;

    fn set_style(&mut self, node: NodeId, style: NodeStyle);

    fn markers(&self, node: NodeId) -> Markers;

    fn set_markers(&mut self, node: NodeId, markers: Markers);

    /// Append a glyph node to `parent`'s inline flow. `None` if `parent` is
    /// unknown.
    fn append_glyph(&mut self, parent: NodeId, glyph: &str, style: NodeStyle) -> Option<NodeId>;

    /// Replace the text of a glyph node.
    fn set_glyph(&mut self, node: NodeId, glyph: &str);

    /// Start a tween on `node`, replacing any tween already running on it.
    fn animate(&mut self, node: NodeId, tween: Tween);

    /// Stop every tween on `node`, leaving it in its current pose.
    fn stop_animations(&mut self, node: NodeId);

    /// Spawn a self-removing particle inside `parent`.
    fn spawn_particle(&mut self, parent: NodeId, spec: &ParticleSpec) -> Option<NodeId>;

    /// Remove every child of `node` (and their tweens). Returns how many
    /// nodes were removed.
    fn clear_children(&mut self, node: NodeId) -> usize;

    fn insert_markers(&mut self, node: NodeId, markers: Markers) {
        let current = self.markers(node);
        self.set_markers(node, current | markers);
    }

    fn remove_markers(&mut self, node: NodeId, markers: Markers) {
        let current = self.markers(node);
        self.set_markers(node, current - markers);
    }

    fn has_markers(&self, node: NodeId, markers: Markers) -> bool {
        self.markers(node).contains(markers)
    }

    /// Box of `node` relative to `container`'s top-left corner.
    fn bounds_within(&self, node: NodeId, container: NodeId) -> Option<BoxF> {
        let outer = self.bounds(container)?;
        Some(self.bounds(node)?.relative_to(&outer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn particle_tween_fades_and_removes() {
        let spec = ParticleSpec {
            glyph: '*',
            origin: PointF::new(3.0, 4.0),
            drift: PointF::new(-10.0, 20.0),
            rotation: 90.0,
            scale: 0.2,
            duration: Duration::from_millis(900),
        };
        let tween = spec.tween();
        assert!(tween.remove_on_complete);
        assert_eq!(tween.from, Some(NodeStyle::REST));
        assert!(tween.to.is_invisible());
        assert_eq!((tween.to.dx, tween.to.dy), (-10.0, 20.0));
    }

    #[test]
    fn markers_compose() {
        let m = Markers::HOT | Markers::DISSOLVING;
        assert!(m.contains(Markers::HOT));
        assert!(!m.contains(Markers::LEAD));
        assert_eq!(Markers::default(), Markers::NONE);
    }
}
