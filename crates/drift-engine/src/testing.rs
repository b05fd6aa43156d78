//! Capability doubles shared by unit tests.

use std::cell::RefCell;
use std::collections::HashMap;

use image::RgbaImage;

use crate::coords::Bounds;
use crate::distortion::DistortionUniforms;
use crate::host::{ElementHandle, LayoutSource};
use crate::render::{ImageUniforms, MeshDesc, MeshId, Renderer, TextureId};
use crate::sync::Placement;

/// Renderer that records every call instead of drawing.
#[derive(Default)]
pub struct RecordingRenderer {
    pub textures: u32,
    next_mesh: u32,
    next_frame: u32,
    pub meshes: HashMap<MeshId, MeshDesc>,
    pub transforms: HashMap<MeshId, Placement>,
    pub uniforms: HashMap<MeshId, ImageUniforms>,
    pub destroyed: Vec<MeshId>,
    pub destroyed_textures: Vec<TextureId>,
    pub viewport: Option<(f64, f64)>,
    pub distortions: Vec<DistortionUniforms>,
    /// Pipeline calls in order: "render", "post", "present".
    pub calls: Vec<&'static str>,
    pub presented: Vec<u32>,
}

impl RecordingRenderer {
    pub fn transform(&self, mesh: MeshId) -> Option<Placement> {
        self.transforms.get(&mesh).copied()
    }
}

impl Renderer for RecordingRenderer {
    type Frame = u32;

    fn create_texture(&mut self, _image: &RgbaImage) -> anyhow::Result<TextureId> {
        self.textures += 1;
        Ok(TextureId(self.textures - 1))
    }

    fn create_mesh(&mut self, desc: MeshDesc) -> anyhow::Result<MeshId> {
        let id = MeshId(self.next_mesh);
        self.next_mesh += 1;
        self.meshes.insert(id, desc);
        Ok(id)
    }

    fn set_mesh_transform(&mut self, mesh: MeshId, placement: Placement) {
        assert!(self.meshes.contains_key(&mesh), "unknown mesh {mesh:?}");
        self.transforms.insert(mesh, placement);
    }

    fn set_mesh_uniforms(&mut self, mesh: MeshId, uniforms: ImageUniforms) {
        self.uniforms.insert(mesh, uniforms);
    }

    fn destroy_mesh(&mut self, mesh: MeshId) {
        self.meshes.remove(&mesh);
        self.transforms.remove(&mesh);
        self.destroyed.push(mesh);
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        assert!(
            self.meshes.values().all(|m| m.texture != texture),
            "texture {texture:?} destroyed while a mesh samples it"
        );
        self.destroyed_textures.push(texture);
    }

    fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = Some((width, height));
    }

    fn render_scene(&mut self) -> anyhow::Result<u32> {
        self.calls.push("render");
        self.next_frame += 1;
        Ok(self.next_frame)
    }

    fn post_process(&mut self, source: u32, uniforms: &DistortionUniforms) -> anyhow::Result<u32> {
        self.calls.push("post");
        self.distortions.push(*uniforms);
        Ok(source + 1000)
    }

    fn present(&mut self, frame: u32) -> anyhow::Result<()> {
        self.calls.push("present");
        self.presented.push(frame);
        Ok(())
    }
}

/// Fixed list of image elements; counts bounding-box reads per element.
#[derive(Default)]
pub struct StaticLayout {
    elements: RefCell<Vec<(String, Bounds)>>,
    reads: RefCell<Vec<usize>>,
}

impl StaticLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, source: &str, bounds: Bounds) -> Self {
        self.elements.borrow_mut().push((source.to_string(), bounds));
        self.reads.borrow_mut().push(0);
        self
    }

    pub fn set_bounds(&self, index: usize, bounds: Bounds) {
        self.elements.borrow_mut()[index].1 = bounds;
    }

    pub fn reads(&self) -> Vec<usize> {
        self.reads.borrow().clone()
    }

    pub fn reset_reads(&self) {
        self.reads.borrow_mut().iter_mut().for_each(|r| *r = 0);
    }
}

impl LayoutSource for StaticLayout {
    fn query_elements(&self, _selector: &str) -> Vec<ElementHandle> {
        (0..self.elements.borrow().len() as u64).map(ElementHandle).collect()
    }

    fn bounding_box(&self, element: ElementHandle) -> Option<Bounds> {
        let i = element.0 as usize;
        let bounds = self.elements.borrow().get(i).map(|(_, b)| *b)?;
        self.reads.borrow_mut()[i] += 1;
        Some(bounds)
    }

    fn image_source(&self, element: ElementHandle) -> Option<String> {
        self.elements.borrow().get(element.0 as usize).map(|(s, _)| s.clone())
    }
}
