//! Scroll-velocity distortion post-process.
//!
//! The per-pixel function lives in [`shading`] and is shared by the CPU
//! [`DistortionPass`] and, line for line, by the WGSL port used by the GPU
//! renderer (`render/gpu/shaders/distortion.wgsl`).
//!
//! Shader inputs: `time`, `scrollSpeed`, `tDiffuse` (the composited frame).

mod noise;
mod pass;
pub mod shading;

pub use noise::{GradientNoise, Noise3};
pub use pass::{DistortionPass, FrameSampler};

/// Tuning for turning scroll velocity into `scrollSpeed`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DistortionConfig {
    /// Logical-pixel velocity → shader speed. With the default velocity clamp
    /// of 400 px this keeps `|scrollSpeed| ≤ 1`.
    pub speed_scale: f64,
}

impl Default for DistortionConfig {
    fn default() -> Self {
        Self { speed_scale: 1.0 / 400.0 }
    }
}

/// Immutable per-tick input of the distortion pass.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct DistortionUniforms {
    pub time: f64,
    pub scroll_speed: f64,
}

impl DistortionUniforms {
    /// Snapshot for a tick; non-finite inputs collapse to zero.
    pub fn from_velocity(time: f64, velocity: f64, config: &DistortionConfig) -> Self {
        let scroll_speed = velocity * config.speed_scale;
        Self {
            time: if time.is_finite() { time } else { 0.0 },
            scroll_speed: if scroll_speed.is_finite() { scroll_speed } else { 0.0 },
        }
    }
}
