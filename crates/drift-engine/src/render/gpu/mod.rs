//! wgpu backend.
//!
//! [`GpuStage`] owns every GPU resource (pipelines, textures, meshes, the
//! offscreen scene target) and lives as long as the window. Each redraw
//! wraps it together with the window's [`Gpu`](crate::device::Gpu) into a
//! short-lived [`GpuRenderer`], which is what the frame loop ticks against.

mod geometry;
mod renderer;
mod stage;
mod uniforms;

pub use renderer::{GpuRenderer, StageFrame};
pub use stage::GpuStage;
