#![forbid(unsafe_code)]

//! Screen-space geometry.
//!
//! [`PointF`], [`SizeF`] and [`BoxF`] are floating-point pixels, origin
//! top-left. Layout, bounding boxes, proximity checks and particle drift all
//! happen here so the animation math never rounds mid-flight.

/// A point in screen space (pixels).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointF {
    pub x: f64,
    pub y: f64,
}

impl PointF {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A size in screen space (pixels).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SizeF {
    pub width: f64,
    pub height: f64,
}

impl SizeF {
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned bounding box in screen space (pixels).
///
/// Width and height are never negative; constructors clamp them to zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoxF {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoxF {
    /// Create a new box.
    #[inline]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Right edge (exclusive).
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Horizontal center.
    #[inline]
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Vertical center.
    #[inline]
    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> PointF {
        PointF::new(self.center_x(), self.center_y())
    }

    /// Check if the box has zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Translate the box.
    #[inline]
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Scale the box about its own center.
    ///
    /// Negative factors are treated as zero.
    pub fn scale_about_center(&self, factor: f64) -> Self {
        let factor = factor.max(0.0);
        let w = self.width * factor;
        let h = self.height * factor;
        let c = self.center();
        Self::new(c.x - w / 2.0, c.y - h / 2.0, w, h)
    }

    /// Express this box relative to another box's origin.
    #[inline]
    pub fn relative_to(&self, container: &BoxF) -> Self {
        Self::new(
            self.x - container.x,
            self.y - container.y,
            self.width,
            self.height,
        )
    }

    /// Smallest box covering both.
    pub fn union(&self, other: &BoxF) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Self::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{BoxF, PointF};

    #[test]
    fn box_center_and_translate() {
        let b = BoxF::new(10.0, 20.0, 8.0, 16.0);
        assert_eq!(b.center(), PointF::new(14.0, 28.0));
        let moved = b.translate(-4.0, 2.0);
        assert_eq!(moved.center_x(), 10.0);
        assert_eq!(moved.width, 8.0);
    }

    #[test]
    fn box_scale_keeps_center() {
        let b = BoxF::new(0.0, 0.0, 10.0, 20.0);
        let s = b.scale_about_center(0.5);
        assert_eq!(s.center(), b.center());
        assert_eq!(s.width, 5.0);
        assert_eq!(s.height, 10.0);
        assert!(b.scale_about_center(-1.0).is_empty());
    }

    #[test]
    fn box_relative_to_container() {
        let container = BoxF::new(100.0, 50.0, 400.0, 40.0);
        let unit = BoxF::new(130.0, 60.0, 10.0, 20.0);
        let rel = unit.relative_to(&container);
        assert_eq!(rel, BoxF::new(30.0, 10.0, 10.0, 20.0));
    }

    #[test]
    fn negative_sizes_clamp_to_zero() {
        let b = BoxF::new(0.0, 0.0, -3.0, 2.0);
        assert_eq!(b.width, 0.0);
        assert!(b.is_empty());
    }

    #[test]
    fn union_covers_both_boxes() {
        let a = BoxF::new(-20.0, 10.0, 30.0, 10.0);
        let b = BoxF::new(0.0, 0.0, 640.0, 5.0);
        assert_eq!(a.union(&b), BoxF::new(-20.0, 0.0, 660.0, 20.0));
        assert_eq!(b.union(&a), a.union(&b));
    }
}
