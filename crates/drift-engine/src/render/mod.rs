//! Rendering backends.
//!
//! The sync core talks to a [`Renderer`]; it never rasterizes itself.
//!
//! Convention:
//! - Scene space is center-origin, +Y up, 1 unit = 1 logical pixel on z = 0.
//! - Frames handed to the distortion pass use `uv` with a top-left origin.

pub mod camera;
pub mod gpu;
mod renderer;
mod software;

pub use camera::PixelCamera;
pub use renderer::{ImageUniforms, MeshDesc, MeshId, Renderer, TextureId};
pub use software::SoftwareRenderer;
