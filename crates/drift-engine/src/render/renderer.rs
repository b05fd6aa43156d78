use image::RgbaImage;

use crate::coords::Vec2;
use crate::distortion::DistortionUniforms;
use crate::sync::Placement;

/// Renderer-owned texture.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextureId(pub u32);

/// Renderer-owned mesh.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub u32);

/// Geometry + material request for one image plane.
///
/// The plane spans `[-0.5, 0.5]²` in model space and is sized through
/// [`Renderer::set_mesh_transform`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MeshDesc {
    pub texture: TextureId,
    /// Grid subdivisions per side (vertex-stage hover ripple needs a few).
    pub segments: u32,
}

/// Per-mesh material snapshot (`hover`, `hoverState`, `time` shader inputs).
///
/// Built fresh every tick; renderers copy it, never hold on to it.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ImageUniforms {
    pub hover: Vec2,
    pub hover_state: f64,
    pub time: f64,
}

/// Rendering backend capability consumed by the sync core.
///
/// The core never rasterizes; it creates textures and meshes once at bind
/// time, updates transforms and uniforms every tick, and asks for one
/// composited frame, one post-processed frame and a present per tick.
///
/// Unknown mesh ids are caller bugs: implementations log and ignore them.
pub trait Renderer {
    /// Handle to a composited frame.
    type Frame;

    fn create_texture(&mut self, image: &RgbaImage) -> anyhow::Result<TextureId>;

    fn create_mesh(&mut self, desc: MeshDesc) -> anyhow::Result<MeshId>;

    fn set_mesh_transform(&mut self, mesh: MeshId, placement: Placement);

    fn set_mesh_uniforms(&mut self, mesh: MeshId, uniforms: ImageUniforms);

    fn destroy_mesh(&mut self, mesh: MeshId);

    /// Releases a texture. Meshes still sampling it must be destroyed first;
    /// the id is never handed out again.
    fn destroy_texture(&mut self, texture: TextureId);

    /// Viewport size in logical pixels; updates the camera.
    fn set_viewport(&mut self, width: f64, height: f64);

    fn render_scene(&mut self) -> anyhow::Result<Self::Frame>;

    /// Runs the scroll distortion over `source` (bound as `tDiffuse`).
    fn post_process(
        &mut self,
        source: Self::Frame,
        uniforms: &DistortionUniforms,
    ) -> anyhow::Result<Self::Frame>;

    fn present(&mut self, frame: Self::Frame) -> anyhow::Result<()>;
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    type Frame = R::Frame;

    fn create_texture(&mut self, image: &RgbaImage) -> anyhow::Result<TextureId> {
        (**self).create_texture(image)
    }

    fn create_mesh(&mut self, desc: MeshDesc) -> anyhow::Result<MeshId> {
        (**self).create_mesh(desc)
    }

    fn set_mesh_transform(&mut self, mesh: MeshId, placement: Placement) {
        (**self).set_mesh_transform(mesh, placement)
    }

    fn set_mesh_uniforms(&mut self, mesh: MeshId, uniforms: ImageUniforms) {
        (**self).set_mesh_uniforms(mesh, uniforms)
    }

    fn destroy_mesh(&mut self, mesh: MeshId) {
        (**self).destroy_mesh(mesh)
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        (**self).destroy_texture(texture)
    }

    fn set_viewport(&mut self, width: f64, height: f64) {
        (**self).set_viewport(width, height)
    }

    fn render_scene(&mut self) -> anyhow::Result<Self::Frame> {
        (**self).render_scene()
    }

    fn post_process(
        &mut self,
        source: Self::Frame,
        uniforms: &DistortionUniforms,
    ) -> anyhow::Result<Self::Frame> {
        (**self).post_process(source, uniforms)
    }

    fn present(&mut self, frame: Self::Frame) -> anyhow::Result<()> {
        (**self).present(frame)
    }
}
