use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::distortion::DistortionUniforms;
use crate::render::ImageUniforms;
use crate::sync::Placement;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

/// Matches `ImageMaterial` in `image.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct MaterialUniform {
    pub model: [[f32; 4]; 4],
    pub hover: [f32; 2],
    pub hover_state: f32,
    pub time: f32,
}

impl MaterialUniform {
    pub(super) fn new(placement: Placement, uniforms: &ImageUniforms) -> Self {
        let model = Mat4::from_translation(Vec3::new(
            placement.position.x as f32,
            placement.position.y as f32,
            0.0,
        )) * Mat4::from_scale(Vec3::new(placement.scale.x as f32, placement.scale.y as f32, 1.0));
        Self {
            model: model.to_cols_array_2d(),
            hover: uniforms.hover.to_f32(),
            hover_state: uniforms.hover_state as f32,
            time: uniforms.time as f32,
        }
    }
}

/// Matches `Distortion` in `distortion.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct DistortionUniform {
    pub time: f32,
    pub scroll_speed: f32,
    pub _pad: [f32; 2], // 16-byte alignment
}

impl From<&DistortionUniforms> for DistortionUniform {
    fn from(u: &DistortionUniforms) -> Self {
        Self {
            time: u.time as f32,
            scroll_speed: u.scroll_speed as f32,
            _pad: [0.0; 2],
        }
    }
}

/// `min_binding_size` for a uniform of type `T`.
pub(super) fn binding_size<T>() -> Option<std::num::NonZeroU64> {
    std::num::NonZeroU64::new(std::mem::size_of::<T>() as u64)
}
