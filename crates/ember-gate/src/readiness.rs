#![forbid(unsafe_code)]

//! Readiness gate: the anchors a run needs before it may start.
//!
//! The host fills one slot per [`Anchor`] as its nodes come into existence.
//! The gate is ready only when every slot holds an attached node and the
//! emitter container has at least one sub-element. Checking readiness never
//! mutates the surface.

use crate::surface::{Markers, NodeId, Surface};

/// A required attachment point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// The portal panel the cinematic plays in.
    Panel,
    /// Container for the scatter phrase.
    ScatterText,
    /// Container for the scramble phrase.
    ScrambleText,
    /// Container pre-populated with identical ember nodes, one marked lead.
    Emitter,
}

impl Anchor {
    pub const ALL: [Anchor; 4] = [
        Anchor::Panel,
        Anchor::ScatterText,
        Anchor::ScrambleText,
        Anchor::Emitter,
    ];

    const fn slot(self) -> usize {
        match self {
            Anchor::Panel => 0,
            Anchor::ScatterText => 1,
            Anchor::ScrambleText => 2,
            Anchor::Emitter => 3,
        }
    }
}

/// What a readiness check found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Every anchor attached and the lead ember found.
    Ready(Anchors),
    /// Some anchor is empty or detached, or the emitter has no sub-elements.
    Waiting,
    /// Emitter sub-elements exist but none is marked lead.
    LeadMissing,
}

/// A complete, checked set of anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchors {
    pub panel: NodeId,
    pub scatter_text: NodeId,
    pub scramble_text: NodeId,
    pub emitter: NodeId,
    pub lead: NodeId,
}

/// One slot per [`Anchor`], each filled at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadinessGate {
    slots: [Option<NodeId>; 4],
}

impl ReadinessGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill a slot. Returns `false` if it already holds a node.
    pub fn fill(&mut self, anchor: Anchor, node: NodeId) -> bool {
        let slot = &mut self.slots[anchor.slot()];
        if slot.is_some() {
            return false;
        }
        *slot = Some(node);
        true
    }

    /// Empty a slot, returning what it held.
    pub fn clear(&mut self, anchor: Anchor) -> Option<NodeId> {
        self.slots[anchor.slot()].take()
    }

    pub fn get(&self, anchor: Anchor) -> Option<NodeId> {
        self.slots[anchor.slot()]
    }

    /// Whether every slot is filled (attachment not checked).
    pub fn is_filled(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Check the surface for a startable set of anchors.
    pub fn check<S: Surface + ?Sized>(&self, surface: &S) -> Readiness {
        let [Some(panel), Some(scatter_text), Some(scramble_text), Some(emitter)] = self.slots
        else {
            return Readiness::Waiting;
        };
        if [panel, scatter_text, scramble_text, emitter]
            .iter()
            .any(|&n| !surface.is_attached(n))
        {
            return Readiness::Waiting;
        }
        let embers = surface.children(emitter);
        if embers.is_empty() {
            return Readiness::Waiting;
        }
        match embers
            .into_iter()
            .find(|&e| surface.has_markers(e, Markers::LEAD))
        {
            Some(lead) => Readiness::Ready(Anchors {
                panel,
                scatter_text,
                scramble_text,
                emitter,
                lead,
            }),
            None => Readiness::LeadMissing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::Stage;
    use ember_core::geometry::{BoxF, PointF};

    fn filled(stage: &mut Stage) -> (ReadinessGate, NodeId) {
        let panel = stage.add_frame(None, BoxF::new(0.0, 0.0, 300.0, 100.0)).unwrap();
        let a = stage.add_frame(Some(panel), BoxF::new(0.0, 0.0, 300.0, 30.0)).unwrap();
        let b = stage.add_frame(Some(panel), BoxF::new(0.0, 40.0, 300.0, 30.0)).unwrap();
        let e = stage.add_frame(Some(panel), BoxF::new(0.0, 0.0, 300.0, 100.0)).unwrap();
        let mut gate = ReadinessGate::new();
        assert!(gate.fill(Anchor::Panel, panel));
        assert!(gate.fill(Anchor::ScatterText, a));
        assert!(gate.fill(Anchor::ScrambleText, b));
        assert!(gate.fill(Anchor::Emitter, e));
        (gate, e)
    }

    #[test]
    fn slots_fill_once() {
        let mut gate = ReadinessGate::new();
        let mut stage = Stage::default();
        let n = stage.add_frame(None, BoxF::default()).unwrap();
        assert!(gate.fill(Anchor::Panel, n));
        assert!(!gate.fill(Anchor::Panel, n));
        assert_eq!(gate.clear(Anchor::Panel), Some(n));
        assert!(gate.fill(Anchor::Panel, n));
    }

    #[test]
    fn waits_for_embers_then_needs_a_lead() {
        let mut stage = Stage::default();
        let (gate, emitter) = filled(&mut stage);
        assert_eq!(gate.check(&stage), Readiness::Waiting);

        let ember = stage.add_sprite(emitter, '●', PointF::new(0.0, 50.0)).unwrap();
        assert_eq!(gate.check(&stage), Readiness::LeadMissing);

        stage.insert_markers(ember, Markers::LEAD);
        assert!(matches!(gate.check(&stage), Readiness::Ready(a) if a.lead == ember));
    }

    #[test]
    fn detached_anchor_is_not_ready() {
        let mut stage = Stage::default();
        let (gate, emitter) = filled(&mut stage);
        let ember = stage.add_sprite(emitter, '●', PointF::new(0.0, 50.0)).unwrap();
        stage.insert_markers(ember, Markers::LEAD);
        stage.detach(gate.get(Anchor::ScrambleText).unwrap());
        assert_eq!(gate.check(&stage), Readiness::Waiting);
    }
}
