use image::{ImageBuffer, Rgba, Rgba32FImage};

use crate::coords::Vec2;

use super::noise::{GradientNoise, Noise3};
use super::shading::{mix, noise_mask, sample_coords};
use super::DistortionUniforms;

/// Readable frame with normalized coordinates (`[0,1]²`, top-left origin).
pub trait FrameSampler {
    fn sample(&self, uv: Vec2) -> [f32; 4];
}

/// Bilinear filtering, clamp-to-edge addressing.
impl FrameSampler for Rgba32FImage {
    fn sample(&self, uv: Vec2) -> [f32; 4] {
        let (w, h) = self.dimensions();
        if w == 0 || h == 0 {
            return [0.0; 4];
        }
        let uv = if uv.is_finite() { uv } else { Vec2::zero() };

        let fx = (uv.x * w as f64 - 0.5).clamp(0.0, (w - 1) as f64);
        let fy = (uv.y * h as f64 - 0.5).clamp(0.0, (h - 1) as f64);
        let (x0, y0) = (fx.floor() as u32, fy.floor() as u32);
        let (x1, y1) = ((x0 + 1).min(w - 1), (y0 + 1).min(h - 1));
        let tx = (fx - x0 as f64) as f32;
        let ty = (fy - y0 as f64) as f32;

        let p00 = self.get_pixel(x0, y0).0;
        let p10 = self.get_pixel(x1, y0).0;
        let p01 = self.get_pixel(x0, y1).0;
        let p11 = self.get_pixel(x1, y1).0;

        let mut out = [0.0f32; 4];
        for c in 0..4 {
            let top = p00[c] + (p10[c] - p00[c]) * tx;
            let bottom = p01[c] + (p11[c] - p01[c]) * tx;
            out[c] = top + (bottom - top) * ty;
        }
        out
    }
}

/// CPU implementation of the distortion post-process.
///
/// Output: red from the forward-sheared sample, green from the back-sheared
/// sample, blue from the undistorted pixel, then blended toward white by the
/// noise mask. Alpha is always 1.
#[derive(Debug, Clone, Default)]
pub struct DistortionPass<N = GradientNoise> {
    noise: N,
}

impl<N: Noise3> DistortionPass<N> {
    pub fn new(noise: N) -> Self {
        Self { noise }
    }

    pub fn noise(&self) -> &N {
        &self.noise
    }

    /// Shades one output pixel at `uv`.
    pub fn shade<S: FrameSampler + ?Sized>(
        &self,
        source: &S,
        uv: Vec2,
        uniforms: &DistortionUniforms,
    ) -> [f32; 4] {
        let coords = sample_coords(uv, uniforms.scroll_speed);
        let r = source.sample(coords.full)[0] as f64;
        let g = source.sample(coords.half)[1] as f64;
        let b = source.sample(coords.base)[2] as f64;
        let crisp = noise_mask(&self.noise, uv, uniforms.time);

        [
            mix(1.0, r, crisp) as f32,
            mix(1.0, g, crisp) as f32,
            mix(1.0, b, crisp) as f32,
            1.0,
        ]
    }

    /// Runs the pass over a whole frame, sampling at pixel centers.
    pub fn apply(&self, source: &Rgba32FImage, uniforms: &DistortionUniforms) -> Rgba32FImage {
        let (w, h) = source.dimensions();
        ImageBuffer::from_fn(w, h, |x, y| {
            let uv = Vec2::new((x as f64 + 0.5) / w as f64, (y as f64 + 0.5) / h as f64);
            Rgba(self.shade(source, uv, uniforms))
        })
    }
}
