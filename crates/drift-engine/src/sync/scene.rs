use std::collections::HashMap;

use crate::coords::{Vec2, ViewportFrame};
use crate::error::{SyncError, SyncResult};
use crate::host::{ElementHandle, LayoutSource};
use crate::preload::PreloadBarrier;
use crate::render::{ImageUniforms, MeshDesc, Renderer, TextureId};

use super::binding::{BindingId, BoundElement};
use super::hover::{HoverConfig, HoverState};
use super::placement::{place, screen_rect, Placement};

/// Plane subdivisions requested for every image mesh.
const MESH_SEGMENTS: u32 = 16;

/// Result of a [`SceneSync::reposition`] call.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Reposition {
    /// Every binding received a new transform.
    Applied(usize),
    /// The frame (or a derived placement) was degenerate; no mesh was touched.
    Skipped,
}

/// Owns the bound elements and keeps their meshes aligned with the layout.
pub struct SceneSync {
    bindings: Vec<BoundElement>,
    textures: HashMap<String, TextureId>,
    hover_config: HoverConfig,
    scratch: Vec<Placement>,
}

impl SceneSync {
    pub fn new(hover_config: HoverConfig) -> Self {
        Self {
            bindings: Vec::new(),
            textures: HashMap::new(),
            hover_config,
            scratch: Vec::new(),
        }
    }

    pub fn bindings(&self) -> &[BoundElement] {
        &self.bindings
    }

    pub fn get(&self, id: BindingId) -> Option<&BoundElement> {
        self.bindings.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Binds `elements`, one result per input element in the same order.
    ///
    /// Reads each element's bounds once and creates its mesh. An element with
    /// zero-area (or missing) geometry, or whose image was not preloaded,
    /// fails on its own; the rest are still bound. Calling this before
    /// `preload` is ready is a contract violation and binds nothing.
    pub fn bind<R, L>(
        &mut self,
        renderer: &mut R,
        layout: &L,
        preload: &PreloadBarrier,
        elements: &[ElementHandle],
    ) -> SyncResult<Vec<SyncResult<BindingId>>>
    where
        R: Renderer + ?Sized,
        L: LayoutSource + ?Sized,
    {
        if !preload.is_ready() {
            log::error!("bind of {} elements attempted before preload resolved", elements.len());
            return Err(SyncError::Precondition);
        }

        let results: Vec<_> = elements
            .iter()
            .map(|&el| self.bind_one(renderer, layout, preload, el))
            .collect();

        let failed = results.iter().filter(|r| r.is_err()).count();
        log::info!(
            "bound {} of {} elements ({failed} rejected)",
            results.len() - failed,
            results.len()
        );

        Ok(results)
    }

    fn bind_one<R, L>(
        &mut self,
        renderer: &mut R,
        layout: &L,
        preload: &PreloadBarrier,
        element: ElementHandle,
    ) -> SyncResult<BindingId>
    where
        R: Renderer + ?Sized,
        L: LayoutSource + ?Sized,
    {
        let bounds = layout.bounding_box(element).unwrap_or_default();
        if !bounds.is_renderable() {
            let err = SyncError::binding(element, bounds.width, bounds.height);
            log::warn!("{err}");
            return Err(err);
        }

        let key = layout.image_source(element);
        let texture = match key.as_deref() {
            Some(k) => match self.textures.get(k) {
                Some(&t) => t,
                None => {
                    let Some(image) = preload.assets().image(k) else {
                        log::warn!("element {element}: image {k:?} was not preloaded");
                        return Err(SyncError::MissingAsset { element, source_key: key });
                    };
                    let t = renderer.create_texture(image)?;
                    self.textures.insert(k.to_string(), t);
                    t
                }
            },
            None => {
                log::warn!("element {element} has no image source");
                return Err(SyncError::MissingAsset { element, source_key: None });
            }
        };

        let mesh = renderer.create_mesh(MeshDesc { texture, segments: MESH_SEGMENTS })?;

        let id = BindingId(self.bindings.len());
        self.bindings.push(BoundElement {
            source: element,
            bounds,
            mesh,
            hover: HoverState::new(self.hover_config),
        });
        log::debug!("bound element {element} -> {mesh:?} at {bounds:?}");
        Ok(id)
    }

    /// Re-reads every binding's bounds from the layout. Call once per resize.
    ///
    /// Elements that vanished or report non-finite geometry keep their
    /// previous bounds. Returns the number of bindings updated.
    pub fn refresh_bounds<L: LayoutSource + ?Sized>(&mut self, layout: &L) -> usize {
        let mut refreshed = 0;
        for b in &mut self.bindings {
            match layout.bounding_box(b.source) {
                Some(bounds) if bounds.is_finite() => {
                    b.bounds = bounds;
                    refreshed += 1;
                }
                other => {
                    log::warn!("element {} reported {other:?} on refresh; keeping cached bounds", b.source);
                }
            }
        }
        log::debug!("refreshed bounds of {refreshed}/{} bindings", self.bindings.len());
        refreshed
    }

    /// Places every mesh for `frame`.
    ///
    /// All placements are computed against the same frame before any is
    /// applied, so either every mesh moves or none does.
    pub fn reposition<R: Renderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        frame: ViewportFrame,
    ) -> Reposition {
        if !frame.is_valid() {
            log::debug!("skipping reposition for degenerate frame {frame:?}");
            return Reposition::Skipped;
        }

        self.scratch.clear();
        self.scratch
            .extend(self.bindings.iter().map(|b| place(b.bounds, frame)));

        if let Some(bad) = self.scratch.iter().position(|p| !p.is_finite()) {
            log::debug!(
                "skipping reposition: non-finite placement for element {}",
                self.bindings[bad].source
            );
            return Reposition::Skipped;
        }

        for (b, p) in self.bindings.iter().zip(&self.scratch) {
            renderer.set_mesh_transform(b.mesh, *p);
        }
        Reposition::Applied(self.bindings.len())
    }

    /// Hit-tests `pointer` (viewport coordinates) against every mesh as drawn
    /// for `frame`, updating hover targets. `None` means the pointer left.
    pub fn update_pointer(&mut self, pointer: Option<Vec2>, frame: ViewportFrame) {
        for b in &mut self.bindings {
            let hit = pointer.and_then(|p| {
                let rect = screen_rect(b.bounds, frame);
                if rect.contains(p) { rect.uv_of(p) } else { None }
            });
            match hit {
                Some(uv) => b.hover.enter(uv),
                None => b.hover.leave(),
            }
        }
    }

    /// Steps hover fades by `dt` seconds and pushes one material snapshot per mesh.
    pub fn advance_materials<R: Renderer + ?Sized>(&mut self, renderer: &mut R, dt: f64, time: f64) {
        for b in &mut self.bindings {
            let hover_state = b.hover.advance(dt);
            renderer.set_mesh_uniforms(
                b.mesh,
                ImageUniforms {
                    hover: b.hover.uv,
                    hover_state,
                    time,
                },
            );
        }
    }

    /// Destroys every owned mesh, then the textures they sampled, and
    /// forgets all bindings.
    pub fn unbind_all<R: Renderer + ?Sized>(&mut self, renderer: &mut R) {
        for b in self.bindings.drain(..) {
            renderer.destroy_mesh(b.mesh);
        }
        for (_, texture) in self.textures.drain() {
            renderer.destroy_texture(texture);
        }
    }
}

impl Default for SceneSync {
    fn default() -> Self {
        Self::new(HoverConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Bounds;
    use crate::testing::{RecordingRenderer, StaticLayout};

    fn ready_with(keys: &[&str]) -> PreloadBarrier {
        let mut barrier = PreloadBarrier::new(None);
        for k in keys {
            barrier.ticket(*k).complete_image(image::RgbaImage::new(4, 4));
        }
        barrier.seal();
        assert!(barrier.poll(std::time::Instant::now()).is_ready());
        barrier
    }

    fn bound_scene(layout: &StaticLayout, renderer: &mut RecordingRenderer) -> SceneSync {
        let barrier = ready_with(&["a.png", "b.png"]);
        let mut sync = SceneSync::default();
        let els = layout.query_elements("img");
        let results = sync.bind(renderer, layout, &barrier, &els).unwrap();
        assert!(results.iter().all(|r| r.is_ok()));
        sync
    }

    #[test]
    fn bind_before_preload_is_precondition_error() {
        let layout = StaticLayout::new().with("a.png", Bounds::new(0.0, 0.0, 10.0, 10.0));
        let mut renderer = RecordingRenderer::default();
        let mut sync = SceneSync::default();
        let pending = PreloadBarrier::new(None);

        let err = sync
            .bind(&mut renderer, &layout, &pending, &layout.query_elements("img"))
            .unwrap_err();
        assert!(matches!(err, SyncError::Precondition));
        assert!(renderer.meshes.is_empty());
    }

    #[test]
    fn zero_area_element_fails_alone() {
        let layout = StaticLayout::new()
            .with("a.png", Bounds::new(0.0, 0.0, 100.0, 50.0))
            .with("b.png", Bounds::new(60.0, 0.0, 0.0, 50.0))
            .with("a.png", Bounds::new(200.0, 0.0, 100.0, 50.0));
        let mut renderer = RecordingRenderer::default();
        let mut sync = SceneSync::default();
        let barrier = ready_with(&["a.png", "b.png"]);

        let results = sync
            .bind(&mut renderer, &layout, &barrier, &layout.query_elements("img"))
            .unwrap();

        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(SyncError::Binding { width, .. }) if width == 0.0));
        assert!(results[2].is_ok());
        assert_eq!(sync.len(), 2);
        assert_eq!(renderer.meshes.len(), 2);
        // Same source shares one texture.
        assert_eq!(renderer.textures, 1);
    }

    #[test]
    fn unknown_image_is_missing_asset() {
        let layout = StaticLayout::new().with("c.png", Bounds::new(0.0, 0.0, 10.0, 10.0));
        let mut renderer = RecordingRenderer::default();
        let mut sync = SceneSync::default();
        let barrier = ready_with(&["a.png"]);

        let results = sync
            .bind(&mut renderer, &layout, &barrier, &layout.query_elements("img"))
            .unwrap();
        assert!(matches!(results[0], Err(SyncError::MissingAsset { .. })));
        assert!(sync.is_empty());
    }

    #[test]
    fn reposition_uses_reference_conversion() {
        let layout = StaticLayout::new().with("a.png", Bounds::new(100.0, 50.0, 200.0, 80.0));
        let mut renderer = RecordingRenderer::default();
        let mut sync = bound_scene(&layout, &mut renderer);

        let out = sync.reposition(&mut renderer, ViewportFrame::new(1000.0, 800.0, 0.0));
        assert_eq!(out, Reposition::Applied(1));

        let p = renderer.transform(sync.bindings()[0].mesh).unwrap();
        assert_eq!(p.position, Vec2::new(-350.0, 260.0));
        assert_eq!(p.scale, Vec2::new(200.0, 80.0));
    }

    #[test]
    fn reposition_is_idempotent_for_identical_frames() {
        let layout = StaticLayout::new()
            .with("a.png", Bounds::new(100.0, 50.0, 200.0, 80.0))
            .with("b.png", Bounds::new(900.0, 300.0, 120.0, 333.0));
        let mut renderer = RecordingRenderer::default();
        let mut sync = bound_scene(&layout, &mut renderer);
        let frame = ViewportFrame::new(1280.0, 720.0, 412.5);

        sync.reposition(&mut renderer, frame);
        let first = renderer.transforms.clone();
        sync.reposition(&mut renderer, frame);
        assert_eq!(renderer.transforms, first);
    }

    #[test]
    fn degenerate_frame_leaves_meshes_untouched() {
        let layout = StaticLayout::new().with("a.png", Bounds::new(0.0, 0.0, 10.0, 10.0));
        let mut renderer = RecordingRenderer::default();
        let mut sync = bound_scene(&layout, &mut renderer);

        sync.reposition(&mut renderer, ViewportFrame::new(800.0, 600.0, 0.0));
        let before = renderer.transforms.clone();

        for frame in [
            ViewportFrame::new(800.0, 0.0, 0.0),
            ViewportFrame::new(0.0, 600.0, 0.0),
            ViewportFrame::new(800.0, 600.0, f64::NAN),
            ViewportFrame::new(f64::INFINITY, 600.0, 0.0),
        ] {
            assert_eq!(sync.reposition(&mut renderer, frame), Reposition::Skipped);
        }
        assert_eq!(renderer.transforms, before);
        assert!(renderer.transforms.values().all(|p| p.is_finite()));
    }

    #[test]
    fn refresh_reads_each_binding_once_and_reposition_follows() {
        let layout = StaticLayout::new()
            .with("a.png", Bounds::new(100.0, 50.0, 200.0, 80.0))
            .with("b.png", Bounds::new(400.0, 50.0, 200.0, 80.0));
        let mut renderer = RecordingRenderer::default();
        let mut sync = bound_scene(&layout, &mut renderer);
        layout.reset_reads();

        layout.set_bounds(0, Bounds::new(10.0, 20.0, 300.0, 120.0));
        assert_eq!(sync.refresh_bounds(&layout), 2);
        assert_eq!(layout.reads(), vec![1, 1]);

        sync.reposition(&mut renderer, ViewportFrame::new(1000.0, 800.0, 0.0));
        let p = renderer.transform(sync.bindings()[0].mesh).unwrap();
        assert_eq!(p.position, Vec2::new(20.0 - 500.0 + 150.0, -10.0 + 400.0 - 60.0));
        assert_eq!(p.scale, Vec2::new(300.0, 120.0));
    }

    #[test]
    fn reposition_never_reads_layout() {
        let layout = StaticLayout::new().with("a.png", Bounds::new(0.0, 0.0, 10.0, 10.0));
        let mut renderer = RecordingRenderer::default();
        let mut sync = bound_scene(&layout, &mut renderer);
        layout.reset_reads();

        for i in 0..10 {
            sync.reposition(&mut renderer, ViewportFrame::new(800.0, 600.0, i as f64));
        }
        assert_eq!(layout.reads(), vec![0]);
    }

    #[test]
    fn pointer_hover_tracks_scrolled_mesh() {
        let layout = StaticLayout::new().with("a.png", Bounds::new(500.0, 100.0, 200.0, 100.0));
        let mut renderer = RecordingRenderer::default();
        let mut sync = bound_scene(&layout, &mut renderer);

        // At scroll 0 the mesh sits below the pointer.
        sync.update_pointer(Some(Vec2::new(150.0, 150.0)), ViewportFrame::new(800.0, 600.0, 0.0));
        assert!(!sync.bindings()[0].hover.inside);

        // Scrolled by 400 the mesh occupies y ∈ [100, 200).
        sync.update_pointer(Some(Vec2::new(150.0, 150.0)), ViewportFrame::new(800.0, 600.0, 400.0));
        let hover = sync.bindings()[0].hover;
        assert!(hover.inside);
        assert_eq!(hover.uv, Vec2::new(0.25, 0.5));

        sync.update_pointer(None, ViewportFrame::new(800.0, 600.0, 400.0));
        assert!(!sync.bindings()[0].hover.inside);
    }

    #[test]
    fn materials_carry_hover_and_time() {
        let layout = StaticLayout::new().with("a.png", Bounds::new(0.0, 0.0, 100.0, 100.0));
        let mut renderer = RecordingRenderer::default();
        let mut sync = bound_scene(&layout, &mut renderer);

        sync.update_pointer(Some(Vec2::new(50.0, 50.0)), ViewportFrame::new(800.0, 600.0, 0.0));
        sync.advance_materials(&mut renderer, 0.5, 3.0);

        let u = renderer.uniforms[&sync.bindings()[0].mesh];
        assert_eq!(u.hover, Vec2::new(0.5, 0.5));
        assert_eq!(u.time, 3.0);
        assert!(u.hover_state > 0.0 && u.hover_state < 1.0);
    }

    #[test]
    fn unbind_all_destroys_meshes() {
        let layout = StaticLayout::new()
            .with("a.png", Bounds::new(0.0, 0.0, 10.0, 10.0))
            .with("b.png", Bounds::new(20.0, 0.0, 10.0, 10.0));
        let mut renderer = RecordingRenderer::default();
        let mut sync = bound_scene(&layout, &mut renderer);

        sync.unbind_all(&mut renderer);
        assert!(sync.is_empty());
        assert!(renderer.meshes.is_empty());
        assert_eq!(renderer.destroyed.len(), 2);

        let mut textures = renderer.destroyed_textures.clone();
        textures.sort_by_key(|t| t.0);
        assert_eq!(textures, vec![TextureId(0), TextureId(1)]);
    }

    #[test]
    fn shared_source_texture_destroyed_once() {
        let layout = StaticLayout::new()
            .with("a.png", Bounds::new(0.0, 0.0, 10.0, 10.0))
            .with("a.png", Bounds::new(20.0, 0.0, 10.0, 10.0));
        let mut renderer = RecordingRenderer::default();
        let mut sync = bound_scene(&layout, &mut renderer);
        assert_eq!(renderer.textures, 1);

        sync.unbind_all(&mut renderer);
        assert_eq!(renderer.destroyed_textures, vec![TextureId(0)]);
    }
}
