#![forbid(unsafe_code)]

//! Dissolve: ignited units burst into ash and fade away.
//!
//! # Invariants
//!
//! 1. A unit spawns particles at most once; dissolving it again is refused
//!    and touches nothing.
//! 2. Completion is detected with an exact comparison
//!    (`dissolved == active_total`) and latched, so it is reported once.

use std::f64::consts::TAU;

use ember_core::animation::{Easing, Tween};
use ember_core::geometry::{BoxF, PointF};
use rand::Rng;
use tracing::debug;

use crate::config::DissolveConfig;
use crate::glyphs::ash_glyph;
use crate::surface::{Markers, NodeId, ParticleSpec, Surface};
use crate::unit::{UnitArena, UnitRejection};

/// Result of one dissolve request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DissolveOutcome {
    /// The unit dissolved. `all_dissolved` is true when it was the last one.
    Dissolved {
        particles: usize,
        all_dissolved: bool,
    },
    /// Nothing happened.
    Skipped(UnitRejection),
}

/// Spawns ash for one unit and fades the source glyph.
#[derive(Debug, Clone, Copy)]
pub struct DissolveEmitter<'a> {
    config: &'a DissolveConfig,
}

impl<'a> DissolveEmitter<'a> {
    pub fn new(config: &'a DissolveConfig) -> Self {
        Self { config }
    }

    /// Random particles for a unit occupying `bounds` (container-relative).
    pub fn particles<R: Rng + ?Sized>(&self, bounds: BoxF, rng: &mut R) -> Vec<ParticleSpec> {
        (0..self.config.particle_count)
            .map(|_| {
                let origin = PointF::new(
                    bounds.x + bounds.width * rng.random::<f64>(),
                    bounds.y + bounds.height * rng.random::<f64>(),
                );
                let angle = rng.random_range(0.0..TAU);
                let distance = self.config.particle_distance.sample(rng);
                ParticleSpec {
                    glyph: ash_glyph(rng),
                    origin,
                    drift: PointF::new(angle.cos() * distance, angle.sin() * distance),
                    rotation: self.config.particle_rotation.sample(rng),
                    scale: self.config.particle_scale.sample(rng),
                    duration: self.config.particle_duration.sample(rng),
                }
            })
            .collect()
    }

    /// Dissolve the unit at arena position `pos` inside `container`.
    pub fn dissolve<S: Surface + ?Sized, R: Rng + ?Sized>(
        &self,
        arena: &mut UnitArena,
        pos: usize,
        container: NodeId,
        surface: &mut S,
        rng: &mut R,
    ) -> DissolveOutcome {
        let Some(unit) = arena.get(pos) else {
            return DissolveOutcome::Skipped(UnitRejection::OutOfRange);
        };
        if unit.is_blank() {
            return DissolveOutcome::Skipped(UnitRejection::Blank);
        }
        if unit.is_dissolved() {
            return DissolveOutcome::Skipped(UnitRejection::AlreadyDone);
        }
        if !unit.is_processed() {
            return DissolveOutcome::Skipped(UnitRejection::NotProcessed);
        }

        let mut spawned = 0;
        if let Some(node) = unit.node() {
            if let Some(bounds) = surface.bounds_within(node, container) {
                for spec in self.particles(bounds, rng) {
                    if surface.spawn_particle(container, &spec).is_some() {
                        spawned += 1;
                    }
                }
            }
            let faded = surface
                .style(node)
                .unwrap_or_default()
                .with_opacity(0.0)
                .with_scale(self.config.source_scale);
            surface.animate(
                node,
                Tween::to(faded, self.config.source_fade).easing(Easing::EaseOut),
            );
            surface.insert_markers(node, Markers::DISSOLVING);
        }

        if let Err(rejection) = arena.mark_dissolved(pos) {
            return DissolveOutcome::Skipped(rejection);
        }
        debug!(
            pos,
            particles = spawned,
            dissolved = arena.dissolved_count(),
            total = arena.active_total(),
            "unit dissolved"
        );
        DissolveOutcome::Dissolved {
            particles: spawned,
            all_dissolved: arena.all_dissolved(),
        }
    }
}

/// One-shot latch for "every unit has dissolved".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompletionLatch {
    fired: bool,
}

impl CompletionLatch {
    /// Returns `true` the first time `arena` reports every unit dissolved.
    pub fn trip(&mut self, arena: &UnitArena) -> bool {
        if self.fired || !arena.all_dissolved() {
            return false;
        }
        self.fired = true;
        true
    }

    #[inline]
    pub fn has_fired(&self) -> bool {
        self.fired
    }
}

/// Fade every ember out from wherever it is now.
pub fn fade_trail<S: Surface + ?Sized>(
    surface: &mut S,
    embers: &[NodeId],
    duration: std::time::Duration,
) {
    for &ember in embers {
        let Some(style) = surface.style(ember) else {
            continue;
        };
        surface.animate(
            ember,
            Tween::to(style.with_opacity(0.0), duration).easing(Easing::EaseOut),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::CharacterFactory;
    use crate::glyphs::GlyphSet;
    use crate::stage::Stage;
    use crate::unit::UnitRole;
    use ember_core::animation::NodeStyle;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::time::Duration;

    fn setup(phrase: &str) -> (Stage, NodeId, UnitArena) {
        let mut stage = Stage::default();
        let line = stage.add_frame(None, BoxF::new(0.0, 0.0, 200.0, 40.0)).unwrap();
        let mut rng = SmallRng::seed_from_u64(11);
        let table = GlyphSet::Alphanumeric.table();
        let mut units = CharacterFactory::new(&table).build(phrase, UnitRole::StaticScatter, &mut rng);
        for u in &mut units {
            u.node = stage.append_glyph(line, &u.current_glyph, NodeStyle::REST);
        }
        (stage, line, UnitArena::new(units, Vec::new()))
    }

    #[test]
    fn second_dissolve_spawns_nothing() {
        let (mut stage, line, mut arena) = setup("ab");
        let cfg = DissolveConfig::default();
        let emitter = DissolveEmitter::new(&cfg);
        let mut rng = SmallRng::seed_from_u64(12);
        arena.claim(0).unwrap();

        let first = emitter.dissolve(&mut arena, 0, line, &mut stage, &mut rng);
        assert_eq!(
            first,
            DissolveOutcome::Dissolved {
                particles: cfg.particle_count,
                all_dissolved: false
            }
        );
        let nodes = stage.node_count();
        let second = emitter.dissolve(&mut arena, 0, line, &mut stage, &mut rng);
        assert_eq!(second, DissolveOutcome::Skipped(UnitRejection::AlreadyDone));
        assert_eq!(stage.node_count(), nodes);
    }

    #[test]
    fn unclaimed_unit_is_refused() {
        let (mut stage, line, mut arena) = setup("a");
        let cfg = DissolveConfig::default();
        let mut rng = SmallRng::seed_from_u64(13);
        let outcome = DissolveEmitter::new(&cfg).dissolve(&mut arena, 0, line, &mut stage, &mut rng);
        assert_eq!(outcome, DissolveOutcome::Skipped(UnitRejection::NotProcessed));
        assert_eq!(stage.children(line).len(), 1);
    }

    #[test]
    fn particles_start_inside_the_unit() {
        let cfg = DissolveConfig::default();
        let mut rng = SmallRng::seed_from_u64(14);
        let bounds = BoxF::new(10.0, 20.0, 16.0, 24.0);
        let specs = DissolveEmitter::new(&cfg).particles(bounds, &mut rng);
        assert_eq!(specs.len(), cfg.particle_count);
        for p in specs {
            assert!(bounds.contains(p.origin) || p.origin.x == bounds.right() || p.origin.y == bounds.bottom());
            assert!(p.duration <= cfg.particle_duration.longest());
            let d = (p.drift.x.powi(2) + p.drift.y.powi(2)).sqrt();
            assert!(d <= cfg.particle_distance.max + 1e-9);
        }
    }

    #[test]
    fn source_fades_and_ash_clears() {
        let (mut stage, line, mut arena) = setup("a");
        let cfg = DissolveConfig::default();
        let mut rng = SmallRng::seed_from_u64(15);
        arena.claim(0).unwrap();
        let outcome = DissolveEmitter::new(&cfg).dissolve(&mut arena, 0, line, &mut stage, &mut rng);
        assert!(matches!(outcome, DissolveOutcome::Dissolved { all_dissolved: true, .. }));

        let mut t = Duration::ZERO;
        while t <= cfg.completion_delay() {
            stage.advance(Duration::from_millis(16));
            t += Duration::from_millis(16);
        }
        let node = arena.get(0).unwrap().node().unwrap();
        assert!(stage.style(node).unwrap().is_invisible());
        assert!(stage.has_markers(node, Markers::DISSOLVING));
        assert_eq!(stage.children(line), vec![node]);
    }

    #[test]
    fn latch_trips_once() {
        let (_stage, _line, mut arena) = setup("a");
        let mut latch = CompletionLatch::default();
        assert!(!latch.trip(&arena));
        arena.claim(0).unwrap();
        arena.mark_dissolved(0).unwrap();
        assert!(latch.trip(&arena));
        assert!(!latch.trip(&arena));
        assert!(latch.has_fired());
    }
}
