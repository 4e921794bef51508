#![forbid(unsafe_code)]

//! Scatter entrance: units fly in from random offsets to rest.

use std::time::Duration;

use ember_core::animation::{NodeStyle, Tween};
use rand::Rng;

use crate::config::ScatterConfig;
use crate::surface::{NodeId, Surface};
use crate::unit::CharacterUnit;

/// Length of the scatter phase for `n` units:
/// `delay + duration + (n - 1) * stagger`, or zero for an empty phrase.
pub fn scatter_total(n: usize, config: &ScatterConfig) -> Duration {
    if n == 0 {
        return Duration::ZERO;
    }
    let steps = u32::try_from(n - 1).unwrap_or(u32::MAX);
    config
        .delay
        .saturating_add(config.duration)
        .saturating_add(config.stagger.saturating_mul(steps))
}

/// Starts the scatter tweens for one phrase.
#[derive(Debug, Clone, Copy)]
pub struct ScatterSequencer<'a> {
    config: &'a ScatterConfig,
}

impl<'a> ScatterSequencer<'a> {
    pub fn new(config: &'a ScatterConfig) -> Self {
        Self { config }
    }

    /// A random starting pose: offset, rotated and invisible.
    pub fn start_pose<R: Rng + ?Sized>(&self, rng: &mut R) -> NodeStyle {
        NodeStyle {
            dx: self.config.offset_x.sample(rng),
            dy: self.config.offset_y.sample(rng),
            rotation: self.config.rotation.sample(rng),
            scale: 1.0,
            opacity: 0.0,
        }
    }

    /// Tween every unit of `container` from a random pose to rest, in index
    /// order with stagger.
    ///
    /// Returns the phase length, or `None` (and does nothing) while
    /// `container` is not attached.
    pub fn start<S: Surface + ?Sized, R: Rng + ?Sized>(
        &self,
        surface: &mut S,
        container: NodeId,
        units: &[CharacterUnit],
        rng: &mut R,
    ) -> Option<Duration> {
        if !surface.is_attached(container) {
            return None;
        }
        for (i, unit) in units.iter().enumerate() {
            let Some(node) = unit.node() else {
                continue;
            };
            if unit.is_blank() {
                surface.set_style(node, NodeStyle::REST);
                continue;
            }
            let from = self.start_pose(rng);
            let step = u32::try_from(i).unwrap_or(u32::MAX);
            let delay = self
                .config
                .delay
                .saturating_add(self.config.stagger.saturating_mul(step));
            surface.set_style(node, from);
            surface.animate(
                node,
                Tween::to(NodeStyle::REST, self.config.duration)
                    .from(from)
                    .delay(delay)
                    .easing(self.config.easing),
            );
        }
        Some(scatter_total(units.len(), self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::CharacterFactory;
    use crate::glyphs::GlyphSet;
    use crate::stage::Stage;
    use crate::unit::UnitRole;
    use ember_core::geometry::BoxF;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn total_matches_formula() {
        let cfg = ScatterConfig::default();
        assert_eq!(scatter_total(0, &cfg), Duration::ZERO);
        assert_eq!(scatter_total(1, &cfg), cfg.delay + cfg.duration);
        assert_eq!(
            scatter_total(5, &cfg),
            cfg.delay + cfg.duration + cfg.stagger * 4
        );
    }

    #[test]
    fn detached_container_is_a_no_op() {
        let mut stage = Stage::default();
        let line = stage.add_frame(None, BoxF::new(0.0, 0.0, 200.0, 30.0)).unwrap();
        stage.detach(line);
        let cfg = ScatterConfig::default();
        let mut rng = SmallRng::seed_from_u64(9);
        let table = GlyphSet::Alphanumeric.table();
        let units = CharacterFactory::new(&table).build("ab", UnitRole::StaticScatter, &mut rng);
        assert_eq!(ScatterSequencer::new(&cfg).start(&mut stage, line, &units, &mut rng), None);
        assert_eq!(stage.tween_count(), 0);
    }

    #[test]
    fn units_come_to_rest() {
        let mut stage = Stage::default();
        let line = stage.add_frame(None, BoxF::new(0.0, 0.0, 200.0, 30.0)).unwrap();
        let cfg = ScatterConfig::default();
        let mut rng = SmallRng::seed_from_u64(10);
        let table = GlyphSet::Alphanumeric.table();
        let mut units = CharacterFactory::new(&table).build("a b", UnitRole::StaticScatter, &mut rng);
        for u in &mut units {
            u.node = stage.append_glyph(line, &u.current_glyph, NodeStyle::HIDDEN);
        }
        let total = ScatterSequencer::new(&cfg)
            .start(&mut stage, line, &units, &mut rng)
            .unwrap();
        // Blank is not animated.
        assert_eq!(stage.tween_count(), 2);
        let mut t = Duration::ZERO;
        while t <= total {
            stage.advance(Duration::from_millis(16));
            t += Duration::from_millis(16);
        }
        for u in &units {
            assert_eq!(stage.style(u.node().unwrap()), Some(NodeStyle::REST));
        }
    }
}
