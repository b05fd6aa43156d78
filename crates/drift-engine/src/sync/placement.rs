use crate::coords::{Bounds, Vec2, ViewportFrame};

/// Scene-space transform of a unit plane mesh.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Placement {
    /// Center of the mesh; origin at the viewport center, +Y up.
    pub position: Vec2,
    /// Plane extent in scene units (1 unit = 1 logical pixel on the z=0 plane).
    pub scale: Vec2,
}

impl Placement {
    #[inline]
    pub fn is_finite(self) -> bool {
        self.position.is_finite() && self.scale.is_finite()
    }
}

/// Converts a layout box (top-left anchored, +Y down) to a scene placement
/// (center anchored, +Y up) for the given frame.
///
/// ```text
/// x =  left - width/2  + w/2
/// y = -top  + height/2 - h/2 + scroll_offset
/// ```
#[inline]
pub fn place(bounds: Bounds, frame: ViewportFrame) -> Placement {
    let x = bounds.left - frame.width / 2.0 + bounds.width / 2.0;
    let y = -bounds.top + frame.height / 2.0 - bounds.height / 2.0 + frame.scroll_offset;
    Placement {
        position: Vec2::new(x, y),
        scale: Vec2::new(bounds.width, bounds.height),
    }
}

/// Where the mesh for `bounds` appears on screen, in viewport coordinates
/// (top-left origin, +Y down).
#[inline]
pub fn screen_rect(bounds: Bounds, frame: ViewportFrame) -> Bounds {
    bounds.scrolled(frame.scroll_offset)
}
