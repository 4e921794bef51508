#![forbid(unsafe_code)]

//! Easing curves shared by every tween in the cinematic.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Easing function applied to normalized tween progress.
///
/// # Example
/// ```
/// use ember_core::animation::Easing;
///
/// let eased = Easing::EaseOut.apply(0.5);
/// assert!(eased > 0.5);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Easing {
    /// Linear interpolation: `t` (no easing).
    #[default]
    Linear,

    // --- Cubic curves ---
    /// Slow start, accelerating: `t³`
    EaseIn,
    /// Slow end, decelerating: `1 - (1-t)³`
    EaseOut,
    /// Smooth S-curve: slow start and end.
    EaseInOut,

    /// Subtle slow end: `1 - (1-t)²`
    EaseOutQuad,
    /// Fast launch that settles hard, used for fly-in entrances.
    EaseOutExpo,
    /// Slight overshoot then settle. **WARNING: Can go < 0 and > 1!**
    Back,
}

impl Easing {
    /// Apply the easing function to a progress value.
    ///
    /// `t` is clamped to `0.0..=1.0`. Every curve maps 0 to 0 and 1 to 1.
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::EaseIn => t * t * t,
            Self::EaseOut => {
                let inv = 1.0 - t;
                1.0 - inv * inv * inv
            }
            Self::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let inv = -2.0 * t + 2.0;
                    1.0 - inv * inv * inv / 2.0
                }
            }
            Self::EaseOutQuad => {
                let inv = 1.0 - t;
                1.0 - inv * inv
            }
            Self::EaseOutExpo => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2.0_f64.powf(-10.0 * t)
                }
            }
            // easeOutBack: 1 + c3 * (t-1)^3 + c1 * (t-1)^2
            Self::Back => {
                let c1 = 1.70158;
                let c3 = c1 + 1.0;
                let t_minus_1 = t - 1.0;
                1.0 + c3 * t_minus_1 * t_minus_1 * t_minus_1 + c1 * t_minus_1 * t_minus_1
            }
        }
    }

    /// Check if this easing can produce values outside 0.0-1.0.
    pub fn can_overshoot(&self) -> bool {
        matches!(self, Self::Back)
    }
}
