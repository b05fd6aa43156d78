use std::collections::BTreeMap;

use anyhow::Context;
use image::{DynamicImage, Rgba, Rgba32FImage, RgbaImage};

use crate::coords::Vec2;
use crate::distortion::{DistortionPass, DistortionUniforms, FrameSampler, GradientNoise, Noise3};
use crate::sync::Placement;

use super::renderer::{ImageUniforms, MeshDesc, MeshId, Renderer, TextureId};

struct SoftMesh {
    desc: MeshDesc,
    placement: Option<Placement>,
    uniforms: ImageUniforms,
}

/// CPU renderer for headless runs and tests.
///
/// Meshes are drawn as flat textured rectangles over a white background in
/// mesh-id order. The hover ripple is a vertex displacement and has no effect
/// here; `hoverState` only brightens the plane slightly.
pub struct SoftwareRenderer<N = GradientNoise> {
    textures: Vec<Option<Rgba32FImage>>,
    meshes: BTreeMap<MeshId, SoftMesh>,
    next_mesh: u32,
    viewport: (f64, f64),
    pass: DistortionPass<N>,
    last_frame: Option<RgbaImage>,
    frames_presented: u64,
}

impl SoftwareRenderer<GradientNoise> {
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_noise(width, height, GradientNoise::default())
    }
}

impl<N: Noise3> SoftwareRenderer<N> {
    pub fn with_noise(width: f64, height: f64, noise: N) -> Self {
        Self {
            textures: Vec::new(),
            meshes: BTreeMap::new(),
            next_mesh: 0,
            viewport: (width, height),
            pass: DistortionPass::new(noise),
            last_frame: None,
            frames_presented: 0,
        }
    }

    /// Last presented frame, 8-bit sRGB-agnostic RGBA.
    pub fn last_frame(&self) -> Option<&RgbaImage> {
        self.last_frame.as_ref()
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.iter().flatten().count()
    }

    fn pixel_size(&self) -> (u32, u32) {
        let px = |v: f64| if v.is_finite() { v.round().clamp(1.0, 16384.0) as u32 } else { 1 };
        (px(self.viewport.0), px(self.viewport.1))
    }

    fn draw_mesh(&self, frame: &mut Rgba32FImage, mesh: &SoftMesh, placement: Placement) {
        let Some(texture) = self.textures.get(mesh.desc.texture.0 as usize).and_then(Option::as_ref) else {
            log::warn!("mesh references unknown texture {:?}", mesh.desc.texture);
            return;
        };
        let (fw, fh) = frame.dimensions();
        let (vw, vh) = self.viewport;
        let size = placement.scale;
        if size.x <= 0.0 || size.y <= 0.0 {
            return;
        }
        // Scene (center origin, +Y up) → viewport (top-left origin, +Y down).
        let left = placement.position.x + vw / 2.0 - size.x / 2.0;
        let top = vh / 2.0 - placement.position.y - size.y / 2.0;

        let x0 = left.floor().max(0.0) as u32;
        let y0 = top.floor().max(0.0) as u32;
        let x1 = ((left + size.x).ceil().max(0.0) as u32).min(fw);
        let y1 = ((top + size.y).ceil().max(0.0) as u32).min(fh);
        let glow = (mesh.uniforms.hover_state.clamp(0.0, 1.0) * 0.08) as f32;

        for y in y0..y1 {
            for x in x0..x1 {
                let u = (x as f64 + 0.5 - left) / size.x;
                let v = (y as f64 + 0.5 - top) / size.y;
                if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
                    continue;
                }
                let src = texture.sample(Vec2::new(u, v));
                let dst = frame.get_pixel_mut(x, y);
                let a = src[3];
                for c in 0..3 {
                    let lit = (src[c] + glow).min(1.0);
                    dst.0[c] = lit * a + dst.0[c] * (1.0 - a);
                }
                dst.0[3] = 1.0;
            }
        }
    }
}

impl<N: Noise3> Renderer for SoftwareRenderer<N> {
    type Frame = Rgba32FImage;

    fn create_texture(&mut self, image: &RgbaImage) -> anyhow::Result<TextureId> {
        anyhow::ensure!(image.width() > 0 && image.height() > 0, "texture image is empty");
        let id = u32::try_from(self.textures.len()).context("texture id space exhausted")?;
        self.textures.push(Some(DynamicImage::ImageRgba8(image.clone()).into_rgba32f()));
        Ok(TextureId(id))
    }

    fn create_mesh(&mut self, desc: MeshDesc) -> anyhow::Result<MeshId> {
        anyhow::ensure!(
            matches!(self.textures.get(desc.texture.0 as usize), Some(Some(_))),
            "mesh references unknown texture {:?}",
            desc.texture
        );
        let id = MeshId(self.next_mesh);
        self.next_mesh = self.next_mesh.checked_add(1).context("mesh id space exhausted")?;
        self.meshes.insert(
            id,
            SoftMesh { desc, placement: None, uniforms: ImageUniforms::default() },
        );
        Ok(id)
    }

    fn set_mesh_transform(&mut self, mesh: MeshId, placement: Placement) {
        match self.meshes.get_mut(&mesh) {
            Some(m) => m.placement = Some(placement),
            None => log::warn!("transform for unknown mesh {mesh:?}"),
        }
    }

    fn set_mesh_uniforms(&mut self, mesh: MeshId, uniforms: ImageUniforms) {
        match self.meshes.get_mut(&mesh) {
            Some(m) => m.uniforms = uniforms,
            None => log::warn!("uniforms for unknown mesh {mesh:?}"),
        }
    }

    fn destroy_mesh(&mut self, mesh: MeshId) {
        if self.meshes.remove(&mesh).is_none() {
            log::warn!("destroy of unknown mesh {mesh:?}");
        }
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        if self.textures.get_mut(texture.0 as usize).and_then(Option::take).is_none() {
            log::warn!("destroy of unknown texture {texture:?}");
        }
    }

    fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = (width, height);
    }

    fn render_scene(&mut self) -> anyhow::Result<Rgba32FImage> {
        let (w, h) = self.pixel_size();
        let mut frame = Rgba32FImage::from_pixel(w, h, Rgba([1.0, 1.0, 1.0, 1.0]));
        for mesh in self.meshes.values() {
            if let Some(p) = mesh.placement {
                self.draw_mesh(&mut frame, mesh, p);
            }
        }
        Ok(frame)
    }

    fn post_process(
        &mut self,
        source: Rgba32FImage,
        uniforms: &DistortionUniforms,
    ) -> anyhow::Result<Rgba32FImage> {
        Ok(self.pass.apply(&source, uniforms))
    }

    fn present(&mut self, frame: Rgba32FImage) -> anyhow::Result<()> {
        self.last_frame = Some(DynamicImage::ImageRgba32F(frame).into_rgba8());
        self.frames_presented += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::coords::{Bounds, ViewportFrame};
    use crate::sync::place;

    use super::*;

    fn red(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([255, 0, 0, 255]))
    }

    fn renderer() -> SoftwareRenderer<fn(f64, f64, f64) -> f64> {
        fn flat(_: f64, _: f64, _: f64) -> f64 {
            1.0
        }
        SoftwareRenderer::with_noise(100.0, 80.0, flat as fn(f64, f64, f64) -> f64)
    }

    #[test]
    fn empty_scene_is_white() {
        let mut r = renderer();
        let frame = r.render_scene().expect("render");
        assert_eq!(frame.dimensions(), (100, 80));
        assert!(frame.pixels().all(|p| p.0 == [1.0, 1.0, 1.0, 1.0]));
    }

    #[test]
    fn placed_mesh_lands_on_its_layout_box() {
        let mut r = renderer();
        let tex = r.create_texture(&red(4, 4)).expect("texture");
        let mesh = r.create_mesh(MeshDesc { texture: tex, segments: 1 }).expect("mesh");

        let bounds = Bounds::new(30.0, 20.0, 40.0, 20.0);
        let frame = ViewportFrame::new(100.0, 80.0, 10.0);
        r.set_mesh_transform(mesh, place(bounds, frame));

        let img = r.render_scene().expect("render");
        // Box scrolled up by 10: rows 20..40, columns 20..60.
        assert_eq!(img.get_pixel(25, 25).0, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(img.get_pixel(59, 39).0, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(img.get_pixel(25, 41).0, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(img.get_pixel(19, 25).0, [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn destroyed_mesh_is_not_drawn() {
        let mut r = renderer();
        let tex = r.create_texture(&red(2, 2)).expect("texture");
        let mesh = r.create_mesh(MeshDesc { texture: tex, segments: 1 }).expect("mesh");
        r.set_mesh_transform(
            mesh,
            place(Bounds::new(0.0, 0.0, 100.0, 80.0), ViewportFrame::new(100.0, 80.0, 0.0)),
        );
        r.destroy_mesh(mesh);
        let img = r.render_scene().expect("render");
        assert_eq!(img.get_pixel(50, 40).0, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(r.mesh_count(), 0);
    }

    #[test]
    fn destroyed_texture_frees_its_slot() {
        let mut r = renderer();
        let a = r.create_texture(&red(2, 2)).expect("texture");
        let b = r.create_texture(&red(2, 2)).expect("texture");
        r.destroy_texture(a);
        assert_eq!(r.texture_count(), 1);
        assert!(r.create_mesh(MeshDesc { texture: a, segments: 1 }).is_err());
        assert!(r.create_mesh(MeshDesc { texture: b, segments: 1 }).is_ok());

        let c = r.create_texture(&red(2, 2)).expect("texture");
        assert_ne!(c, a);
    }

    #[test]
    fn mesh_with_unknown_texture_is_rejected() {
        let mut r = renderer();
        assert!(r.create_mesh(MeshDesc { texture: TextureId(3), segments: 1 }).is_err());
    }

    #[test]
    fn present_stores_8bit_frame() {
        let mut r = renderer();
        let frame = r.render_scene().expect("render");
        let out = r
            .post_process(frame, &DistortionUniforms { time: 0.0, scroll_speed: 0.0 })
            .expect("post");
        r.present(out).expect("present");
        let last = r.last_frame().expect("frame");
        assert_eq!(last.dimensions(), (100, 80));
        assert_eq!(last.get_pixel(3, 3).0, [255, 255, 255, 255]);
        assert_eq!(r.frames_presented(), 1);
    }

    #[test]
    fn viewport_change_resizes_frames() {
        let mut r = renderer();
        r.set_viewport(30.0, 12.0);
        assert_eq!(r.render_scene().expect("render").dimensions(), (30, 12));
    }
}
