//! Per-pixel math of the distortion pass. `uv ∈ [0,1]²`, origin top-left.

use crate::coords::Vec2;

use super::noise::Noise3;

/// Bottom edge of the shear band: full strength at `uv.y = 0`, none past this.
pub const SHEAR_BAND: f64 = 0.25;
/// Shear factor of the red-channel sample.
pub const FULL_SHEAR: f64 = 0.5;
/// Shear factor (opposite sign) of the green-channel sample.
pub const HALF_SHEAR: f64 = 0.3;
/// Spatial frequency of the noise field.
pub const NOISE_SCALE: f64 = 5.0;
/// `time` is divided by this before feeding the noise's third axis.
pub const NOISE_TIME_DIVISOR: f64 = 5.0;

/// GLSL-style Hermite step. Edges may be reversed; equal edges act as a hard
/// step (`0` below the edge, `1` at or above it).
#[inline]
pub fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    if edge0 == edge1 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[inline]
pub fn mix(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// The three source coordinates a pixel reads from.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SampleCoords {
    /// Red channel.
    pub full: Vec2,
    /// Green channel.
    pub half: Vec2,
    /// Blue channel (undistorted).
    pub base: Vec2,
}

/// Shear band mask: 1 at the top edge, 0 from `SHEAR_BAND` down.
#[inline]
pub fn shear_area(uv: Vec2) -> f64 {
    smoothstep(SHEAR_BAND, 0.0, uv.y)
}

/// Horizontally sheared sample coordinates for `uv`.
///
/// Offsets scale with the distance from the vertical center line, the band
/// mask and `scroll_speed`; both collapse to `uv` when the speed is zero.
#[inline]
pub fn sample_coords(uv: Vec2, scroll_speed: f64) -> SampleCoords {
    let shear = (uv.x - 0.5) * shear_area(uv) * scroll_speed;
    SampleCoords {
        full: Vec2::new(uv.x + shear * FULL_SHEAR, uv.y),
        half: Vec2::new(uv.x - shear * HALF_SHEAR, uv.y),
        base: uv,
    }
}

/// Binary-ish visibility mask from the animated noise field.
///
/// The lower part of the frame (`uv.y > 0.6`) is biased toward 0, so the
/// noise eats into it; 0 blends fully to white.
#[inline]
pub fn noise_mask<N: Noise3 + ?Sized>(noise: &N, uv: Vec2, time: f64) -> f64 {
    let mask_area = smoothstep(1.0, 0.6, uv.y) * 2.0 - 1.0;
    let n = 0.5
        * (noise.sample(uv.x * NOISE_SCALE, uv.y * NOISE_SCALE, time / NOISE_TIME_DIVISOR) + 1.0);
    smoothstep(0.5, 0.5, n + mask_area)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoothstep_matches_glsl_inside_range() {
        assert_eq!(smoothstep(0.0, 1.0, 0.5), 0.5);
        assert_eq!(smoothstep(0.0, 1.0, -3.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 3.0), 1.0);
    }

    #[test]
    fn smoothstep_reversed_edges_falls_off() {
        assert_eq!(smoothstep(0.25, 0.0, 0.0), 1.0);
        assert_eq!(smoothstep(0.25, 0.0, 0.25), 0.0);
        assert_eq!(smoothstep(0.25, 0.0, 0.9), 0.0);
        assert_eq!(smoothstep(0.25, 0.0, 0.125), 0.5);
    }

    #[test]
    fn smoothstep_equal_edges_is_step() {
        assert_eq!(smoothstep(0.5, 0.5, 0.499), 0.0);
        assert_eq!(smoothstep(0.5, 0.5, 0.5), 1.0);
        assert_eq!(smoothstep(0.5, 0.5, 2.0), 1.0);
    }

    #[test]
    fn zero_speed_collapses_all_samples() {
        for iy in 0..=20 {
            for ix in 0..=20 {
                let uv = Vec2::new(ix as f64 / 20.0, iy as f64 / 20.0);
                let c = sample_coords(uv, 0.0);
                assert_eq!(c.full, uv);
                assert_eq!(c.half, uv);
                assert_eq!(c.base, uv);
            }
        }
    }

    #[test]
    fn shear_has_opposite_signs_and_ratio() {
        let uv = Vec2::new(0.9, 0.0);
        let c = sample_coords(uv, 1.0);
        let full = c.full.x - uv.x;
        let half = c.half.x - uv.x;
        assert!(full > 0.0 && half < 0.0);
        assert!((full / -half - FULL_SHEAR / HALF_SHEAR).abs() < 1e-12);
        assert!((full - 0.4 * 0.5).abs() < 1e-12);
    }

    #[test]
    fn shear_vanishes_below_band_and_on_center_line() {
        let below = sample_coords(Vec2::new(0.9, 0.5), 1.0);
        assert_eq!(below.full, below.base);
        let center = sample_coords(Vec2::new(0.5, 0.0), 1.0);
        assert_eq!(center.half, center.base);
    }

    #[test]
    fn noise_mask_keeps_top_and_dissolves_bottom_on_low_noise() {
        let low = |_: f64, _: f64, _: f64| -1.0;
        assert_eq!(noise_mask(&low, Vec2::new(0.3, 0.2), 0.0), 1.0);
        assert_eq!(noise_mask(&low, Vec2::new(0.3, 0.95), 0.0), 0.0);

        let high = |_: f64, _: f64, _: f64| 1.0;
        assert_eq!(noise_mask(&high, Vec2::new(0.3, 0.95), 0.0), 1.0);
    }
}
