//! GPU device + surface management.
//!
//! Creates the wgpu Adapter/Device/Queue for a window, configures its
//! surface and hands out acquired frames to the renderer.

mod gpu;

pub use gpu::{Gpu, GpuFrame, GpuInit, SurfaceErrorAction};
