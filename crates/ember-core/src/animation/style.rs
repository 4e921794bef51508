#![forbid(unsafe_code)]

//! Visual pose of a rendered node: offset, rotation, scale and opacity.

/// Per-node visual style applied on top of the node's laid-out position.
///
/// `rotation` is in degrees. `scale` multiplies the laid-out box about its
/// center. `opacity` is kept in `0.0..=1.0` by [`NodeStyle::lerp`] and
/// [`NodeStyle::clamped`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeStyle {
    pub dx: f64,
    pub dy: f64,
    pub rotation: f64,
    pub scale: f64,
    pub opacity: f64,
}

impl NodeStyle {
    /// Rest pose: no offset, no rotation, full size, fully visible.
    pub const REST: Self = Self {
        dx: 0.0,
        dy: 0.0,
        rotation: 0.0,
        scale: 1.0,
        opacity: 1.0,
    };

    /// Rest pose with zero opacity.
    pub const HIDDEN: Self = Self {
        opacity: 0.0,
        ..Self::REST
    };

    /// Offset-only pose at full opacity.
    #[inline]
    pub const fn at(dx: f64, dy: f64) -> Self {
        Self { dx, dy, ..Self::REST }
    }

    #[must_use]
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    #[must_use]
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    /// Clamp opacity into `0.0..=1.0` and scale to be non-negative.
    #[must_use]
    pub fn clamped(mut self) -> Self {
        self.opacity = self.opacity.clamp(0.0, 1.0);
        self.scale = self.scale.max(0.0);
        self
    }

    /// Interpolate every channel between `self` and `to`.
    ///
    /// `t` is not clamped so overshooting easings carry through to offsets;
    /// the result is passed through [`NodeStyle::clamped`].
    pub fn lerp(&self, to: &NodeStyle, t: f64) -> NodeStyle {
        let mix = |a: f64, b: f64| a + (b - a) * t;
        NodeStyle {
            dx: mix(self.dx, to.dx),
            dy: mix(self.dy, to.dy),
            rotation: mix(self.rotation, to.rotation),
            scale: mix(self.scale, to.scale),
            opacity: mix(self.opacity, to.opacity),
        }
        .clamped()
    }

    /// True when the node is fully transparent.
    #[inline]
    pub fn is_invisible(&self) -> bool {
        self.opacity <= 0.0
    }
}

impl Default for NodeStyle {
    fn default() -> Self {
        Self::REST
    }
}

#[cfg(test)]
mod tests {
    use super::NodeStyle;

    #[test]
    fn lerp_midpoint() {
        let from = NodeStyle {
            dx: -100.0,
            dy: 40.0,
            rotation: 90.0,
            scale: 1.0,
            opacity: 0.0,
        };
        let mid = from.lerp(&NodeStyle::REST, 0.5);
        assert_eq!(mid.dx, -50.0);
        assert_eq!(mid.dy, 20.0);
        assert_eq!(mid.rotation, 45.0);
        assert_eq!(mid.opacity, 0.5);
    }

    #[test]
    fn lerp_clamps_opacity_on_overshoot() {
        let v = NodeStyle::HIDDEN.lerp(&NodeStyle::REST, 1.3);
        assert_eq!(v.opacity, 1.0);
        let v = NodeStyle::REST.lerp(&NodeStyle::REST.with_scale(0.0), 1.5);
        assert_eq!(v.scale, 0.0);
    }

    #[test]
    fn hidden_is_invisible() {
        assert!(NodeStyle::HIDDEN.is_invisible());
        assert!(!NodeStyle::REST.is_invisible());
    }
}
