use anyhow::Context;
use image::RgbaImage;

use crate::device::{Gpu, GpuFrame, SurfaceErrorAction};
use crate::distortion::DistortionUniforms;
use crate::render::{ImageUniforms, MeshDesc, MeshId, Renderer, TextureId};
use crate::sync::Placement;

use super::stage::GpuStage;
use super::uniforms::DistortionUniform;

/// Frame handle of the GPU backend.
pub enum StageFrame {
    /// The scene was rendered into the stage's offscreen target.
    Scene,
    /// Distortion recorded into an acquired surface texture, not yet submitted.
    Surface(GpuFrame),
    /// Nothing to show this tick (zero-size window, transient surface error).
    Skipped,
}

/// Per-redraw view of a [`GpuStage`] bound to a window's [`Gpu`].
pub struct GpuRenderer<'a, 'w> {
    stage: &'a mut GpuStage,
    gpu: &'a mut Gpu<'w>,
}

impl<'a, 'w> GpuRenderer<'a, 'w> {
    pub fn new(stage: &'a mut GpuStage, gpu: &'a mut Gpu<'w>) -> Self {
        stage.ensure_resources(gpu.device(), gpu.surface_format());
        Self { stage, gpu }
    }

    fn drawable_size(&self) -> Option<(u32, u32)> {
        let size = self.gpu.size();
        (size.width > 0 && size.height > 0).then_some((size.width, size.height))
    }
}

impl Renderer for GpuRenderer<'_, '_> {
    type Frame = StageFrame;

    fn create_texture(&mut self, image: &RgbaImage) -> anyhow::Result<TextureId> {
        self.stage.upload_texture(self.gpu.device(), self.gpu.queue(), image)
    }

    fn create_mesh(&mut self, desc: MeshDesc) -> anyhow::Result<MeshId> {
        self.stage.create_mesh(self.gpu.device(), desc)
    }

    fn set_mesh_transform(&mut self, mesh: MeshId, placement: Placement) {
        match self.stage.meshes.get_mut(&mesh) {
            Some(m) => m.placement = Some(placement),
            None => log::warn!("transform for unknown mesh {mesh:?}"),
        }
    }

    fn set_mesh_uniforms(&mut self, mesh: MeshId, uniforms: ImageUniforms) {
        match self.stage.meshes.get_mut(&mesh) {
            Some(m) => m.uniforms = uniforms,
            None => log::warn!("uniforms for unknown mesh {mesh:?}"),
        }
    }

    fn destroy_mesh(&mut self, mesh: MeshId) {
        if self.stage.meshes.remove(&mesh).is_none() {
            log::warn!("destroy of unknown mesh {mesh:?}");
        }
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        self.stage.release_texture(texture);
    }

    fn set_viewport(&mut self, width: f64, height: f64) {
        self.stage.camera.resize(width, height);
    }

    fn render_scene(&mut self) -> anyhow::Result<StageFrame> {
        let Some(size) = self.drawable_size() else {
            return Ok(StageFrame::Skipped);
        };
        self.stage.ensure_target(self.gpu.device(), size)?;

        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("drift scene encoder"),
            });
        self.stage.encode_scene(self.gpu.queue(), &mut encoder)?;
        self.gpu.queue().submit(std::iter::once(encoder.finish()));
        Ok(StageFrame::Scene)
    }

    fn post_process(
        &mut self,
        source: StageFrame,
        uniforms: &DistortionUniforms,
    ) -> anyhow::Result<StageFrame> {
        if !matches!(source, StageFrame::Scene) {
            return Ok(source);
        }

        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                return match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => Err(anyhow::anyhow!("surface out of memory")),
                    action => {
                        log::debug!("skipping frame after surface error ({action:?})");
                        Ok(StageFrame::Skipped)
                    }
                };
            }
        };

        self.stage
            .encode_distortion(
                self.gpu.queue(),
                &mut frame.encoder,
                &frame.view,
                DistortionUniform::from(uniforms),
            )
            .context("recording distortion pass")?;
        Ok(StageFrame::Surface(frame))
    }

    fn present(&mut self, frame: StageFrame) -> anyhow::Result<()> {
        match frame {
            StageFrame::Surface(frame) => self.gpu.submit(frame),
            StageFrame::Scene => log::warn!("scene frame presented without post-processing"),
            StageFrame::Skipped => {}
        }
        Ok(())
    }
}
