/// Per-tick coordinate transform parameters shared by every bound element.
///
/// `width`/`height` are the viewport size in logical pixels; `scroll_offset`
/// is the smoothed scroll position the scene is drawn at. A single value is
/// built once per tick and handed to every placement computation.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ViewportFrame {
    pub width: f64,
    pub height: f64,
    pub scroll_offset: f64,
}

impl ViewportFrame {
    #[inline]
    pub const fn new(width: f64, height: f64, scroll_offset: f64) -> Self {
        Self { width, height, scroll_offset }
    }

    /// `false` for hidden containers (zero size) and for any non-finite field.
    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0
            && self.height > 0.0
            && self.width.is_finite()
            && self.height.is_finite()
            && self.scroll_offset.is_finite()
    }

    #[inline]
    pub fn with_scroll(self, scroll_offset: f64) -> Self {
        Self { scroll_offset, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_height_is_invalid() {
        assert!(!ViewportFrame::new(800.0, 0.0, 0.0).is_valid());
    }

    #[test]
    fn nan_scroll_is_invalid() {
        assert!(!ViewportFrame::new(800.0, 600.0, f64::NAN).is_valid());
    }

    #[test]
    fn regular_frame_is_valid() {
        assert!(ViewportFrame::new(800.0, 600.0, -120.0).is_valid());
    }
}
