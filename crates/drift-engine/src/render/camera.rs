use glam::{Mat4, Vec3};

/// Perspective camera whose z = 0 plane maps 1:1 to logical pixels.
///
/// The vertical field of view is derived from the viewport height and the
/// camera distance, `fov = 2·atan((h/2) / distance)`, so a unit plane scaled
/// to `w×h` scene units covers exactly `w×h` pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PixelCamera {
    width: f32,
    height: f32,
    pub distance: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for PixelCamera {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            distance: 600.0,
            near: 100.0,
            far: 2000.0,
        }
    }
}

impl PixelCamera {
    pub fn new(width: f64, height: f64) -> Self {
        let mut cam = Self::default();
        cam.resize(width, height);
        cam
    }

    /// Non-positive or non-finite sizes are ignored.
    pub fn resize(&mut self, width: f64, height: f64) {
        if width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite() {
            self.width = width as f32;
            self.height = height as f32;
        }
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn fov_y(&self) -> f32 {
        2.0 * ((self.height / 2.0) / self.distance).atan()
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(Vec3::new(0.0, 0.0, self.distance), Vec3::ZERO, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y(), self.width / self.height, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn z0_plane_maps_pixels_to_ndc() {
        let cam = PixelCamera::new(1000.0, 800.0);
        let vp = cam.view_proj();
        let ndc = vp.project_point3(Vec3::new(250.0, -200.0, 0.0));
        assert!((ndc.x - 0.5).abs() < 1e-4, "{ndc:?}");
        assert!((ndc.y + 0.5).abs() < 1e-4, "{ndc:?}");
    }

    #[test]
    fn viewport_corners_hit_ndc_corners() {
        let cam = PixelCamera::new(640.0, 480.0);
        let ndc = cam.view_proj().project_point3(Vec3::new(320.0, 240.0, 0.0));
        assert!((ndc.x - 1.0).abs() < 1e-4);
        assert!((ndc.y - 1.0).abs() < 1e-4);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn degenerate_resize_is_ignored() {
        let mut cam = PixelCamera::new(300.0, 200.0);
        cam.resize(0.0, 10.0);
        cam.resize(f64::NAN, 10.0);
        assert_eq!(cam.size(), (300.0, 200.0));
    }
}
