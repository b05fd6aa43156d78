use super::Vec2;

/// Screen-space bounding box of a layout element, in logical pixels.
///
/// `top`/`left` are page coordinates (top-left origin, +Y down) measured with
/// the document scrolled to zero, so the same box stays valid while the page
/// scrolls and only changes on reflow.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Bounds {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    #[inline]
    pub const fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self { top, left, width, height }
    }

    #[inline]
    pub fn bottom(self) -> f64 {
        self.top + self.height
    }

    #[inline]
    pub fn right(self) -> f64 {
        self.left + self.width
    }

    #[inline]
    pub fn size(self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Nothing to render: zero or negative extent on either axis.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.top.is_finite() && self.left.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Renderable means finite and non-empty.
    #[inline]
    pub fn is_renderable(self) -> bool {
        self.is_finite() && !self.is_empty()
    }

    /// Returns the box moved up by `scroll` pixels (page space → viewport space).
    #[inline]
    pub fn scrolled(self, scroll: f64) -> Self {
        Self { top: self.top - scroll, ..self }
    }

    /// Half-open containment: [min, max).
    #[inline]
    pub fn contains(self, p: Vec2) -> bool {
        p.x >= self.left && p.y >= self.top && p.x < self.right() && p.y < self.bottom()
    }

    /// Position of `p` relative to the box, normalized to `[0,1]²` with the
    /// origin at the bottom-left corner (texture-coordinate orientation of a
    /// plane mesh).
    ///
    /// Returns `None` for empty boxes.
    #[inline]
    pub fn uv_of(self, p: Vec2) -> Option<Vec2> {
        if self.is_empty() {
            return None;
        }
        let u = (p.x - self.left) / self.width;
        let v = 1.0 - (p.y - self.top) / self.height;
        Some(Vec2::new(u, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b(top: f64, left: f64, w: f64, h: f64) -> Bounds {
        Bounds::new(top, left, w, h)
    }

    // ── is_empty ──────────────────────────────────────────────────────────

    #[test]
    fn is_empty_zero_size() {
        assert!(b(0.0, 0.0, 0.0, 5.0).is_empty());
        assert!(b(0.0, 0.0, 5.0, 0.0).is_empty());
    }

    #[test]
    fn is_empty_negative_size() {
        assert!(b(0.0, 0.0, -4.0, 5.0).is_empty());
    }

    #[test]
    fn is_renderable_rejects_nan() {
        assert!(!b(f64::NAN, 0.0, 10.0, 10.0).is_renderable());
        assert!(b(0.0, 0.0, 10.0, 10.0).is_renderable());
    }

    // ── contains ──────────────────────────────────────────────────────────

    #[test]
    fn contains_top_left_inclusive() {
        assert!(b(10.0, 20.0, 5.0, 5.0).contains(Vec2::new(20.0, 10.0)));
    }

    #[test]
    fn contains_bottom_right_exclusive() {
        assert!(!b(10.0, 20.0, 5.0, 5.0).contains(Vec2::new(25.0, 15.0)));
    }

    // ── scrolled / uv_of ──────────────────────────────────────────────────

    #[test]
    fn scrolled_moves_box_up() {
        let s = b(300.0, 10.0, 50.0, 50.0).scrolled(120.0);
        assert_eq!(s.top, 180.0);
        assert_eq!(s.left, 10.0);
    }

    #[test]
    fn uv_origin_is_bottom_left() {
        let r = b(0.0, 0.0, 200.0, 100.0);
        assert_eq!(r.uv_of(Vec2::new(0.0, 100.0)), Some(Vec2::new(0.0, 0.0)));
        assert_eq!(r.uv_of(Vec2::new(100.0, 25.0)), Some(Vec2::new(0.5, 0.75)));
    }

    #[test]
    fn uv_of_empty_box_is_none() {
        assert!(b(0.0, 0.0, 0.0, 10.0).uv_of(Vec2::zero()).is_none());
    }
}
