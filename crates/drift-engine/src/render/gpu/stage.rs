use std::collections::HashMap;

use anyhow::Context;
use image::RgbaImage;
use wgpu::util::DeviceExt;

use crate::render::camera::PixelCamera;
use crate::render::{ImageUniforms, MeshDesc, MeshId, TextureId};
use crate::sync::Placement;

use super::geometry::{plane_grid, PlaneVertex};
use super::uniforms::{binding_size, CameraUniform, DistortionUniform, MaterialUniform};

pub(super) struct GridBuffers {
    pub vbo: wgpu::Buffer,
    pub ibo: wgpu::Buffer,
    pub index_count: u32,
}

pub(super) struct GpuMesh {
    pub segments: u32,
    pub ubo: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub placement: Option<Placement>,
    pub uniforms: ImageUniforms,
}

pub(super) struct SceneTarget {
    pub size: (u32, u32),
    pub view: wgpu::TextureView,
    pub bind_group: wgpu::BindGroup,
}

/// Persistent GPU state of the image scene and the distortion pass.
///
/// Pipelines are created lazily for the surface format in use and rebuilt if
/// it changes. Textures and meshes live until destroyed or the stage drops.
#[derive(Default)]
pub struct GpuStage {
    pipeline_format: Option<wgpu::TextureFormat>,

    image_pipeline: Option<wgpu::RenderPipeline>,
    camera_bgl: Option<wgpu::BindGroupLayout>,
    material_bgl: Option<wgpu::BindGroupLayout>,
    camera_ubo: Option<wgpu::Buffer>,
    camera_bg: Option<wgpu::BindGroup>,

    distortion_pipeline: Option<wgpu::RenderPipeline>,
    distortion_bgl: Option<wgpu::BindGroupLayout>,
    distortion_ubo: Option<wgpu::Buffer>,

    sampler: Option<wgpu::Sampler>,

    pub(super) camera: PixelCamera,
    /// Indexed by `TextureId`; released slots stay `None`.
    textures: Vec<Option<wgpu::TextureView>>,
    pub(super) grids: HashMap<u32, GridBuffers>,
    pub(super) meshes: HashMap<MeshId, GpuMesh>,
    next_mesh: u32,
    pub(super) target: Option<SceneTarget>,
}

impl GpuStage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Textures still resident.
    pub fn texture_count(&self) -> usize {
        self.textures.iter().flatten().count()
    }

    pub(super) fn release_texture(&mut self, texture: TextureId) {
        if self.textures.get_mut(texture.0 as usize).and_then(Option::take).is_none() {
            log::warn!("destroy of unknown texture {texture:?}");
        }
    }

    /// Makes sure layouts, shared buffers, the sampler and pipelines for
    /// `format` exist.
    pub(super) fn ensure_resources(&mut self, device: &wgpu::Device, format: wgpu::TextureFormat) {
        self.ensure_sampler(device);
        self.ensure_layouts(device);
        if self.pipeline_format == Some(format)
            && self.image_pipeline.is_some()
            && self.distortion_pipeline.is_some()
        {
            return;
        }
        if self.pipeline_format.is_some() {
            log::debug!("surface format changed to {format:?}; rebuilding drift pipelines");
        }
        self.image_pipeline = self.build_image_pipeline(device, format);
        self.distortion_pipeline = self.build_distortion_pipeline(device, format);
        self.pipeline_format = Some(format);
        // The scene target shares the surface format.
        self.target = None;
    }

    fn ensure_sampler(&mut self, device: &wgpu::Device) {
        if self.sampler.is_some() {
            return;
        }
        self.sampler = Some(device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("drift linear clamp sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        }));
    }

    fn ensure_layouts(&mut self, device: &wgpu::Device) {
        if self.camera_bg.is_some() && self.material_bgl.is_some() && self.distortion_bgl.is_some() {
            return;
        }

        let camera_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("drift camera bgl"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX, binding_size::<CameraUniform>())],
        });

        let material_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("drift material bgl"),
            entries: &[
                uniform_entry(
                    0,
                    wgpu::ShaderStages::VERTEX_FRAGMENT,
                    binding_size::<MaterialUniform>(),
                ),
                texture_entry(1),
                sampler_entry(2),
            ],
        });

        let distortion_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("drift distortion bgl"),
            entries: &[
                texture_entry(0),
                sampler_entry(1),
                uniform_entry(2, wgpu::ShaderStages::FRAGMENT, binding_size::<DistortionUniform>()),
            ],
        });

        let camera_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("drift camera ubo"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let camera_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("drift camera bind group"),
            layout: &camera_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_ubo.as_entire_binding(),
            }],
        });

        let distortion_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("drift distortion ubo"),
            size: std::mem::size_of::<DistortionUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        self.camera_bgl = Some(camera_bgl);
        self.material_bgl = Some(material_bgl);
        self.distortion_bgl = Some(distortion_bgl);
        self.camera_ubo = Some(camera_ubo);
        self.camera_bg = Some(camera_bg);
        self.distortion_ubo = Some(distortion_ubo);
    }

    fn build_image_pipeline(
        &self,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
    ) -> Option<wgpu::RenderPipeline> {
        let camera_bgl = self.camera_bgl.as_ref()?;
        let material_bgl = self.material_bgl.as_ref()?;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("drift image shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/image.wgsl").into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("drift image pipeline layout"),
            bind_group_layouts: &[camera_bgl, material_bgl],
            immediate_size: 0,
        });

        Some(device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("drift image pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[PlaneVertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        }))
    }

    fn build_distortion_pipeline(
        &self,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
    ) -> Option<wgpu::RenderPipeline> {
        let bgl = self.distortion_bgl.as_ref()?;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("drift distortion shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/distortion.wgsl").into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("drift distortion pipeline layout"),
            bind_group_layouts: &[bgl],
            immediate_size: 0,
        });

        Some(device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("drift distortion pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        }))
    }

    /// (Re)creates the offscreen scene texture when the drawable size changes.
    pub(super) fn ensure_target(&mut self, device: &wgpu::Device, size: (u32, u32)) -> anyhow::Result<()> {
        if self.target.as_ref().is_some_and(|t| t.size == size) {
            return Ok(());
        }
        let format = self.pipeline_format.context("pipelines not built")?;
        let bgl = self.distortion_bgl.as_ref().context("distortion layout missing")?;
        let sampler = self.sampler.as_ref().context("sampler missing")?;
        let ubo = self.distortion_ubo.as_ref().context("distortion ubo missing")?;

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("drift scene target"),
            size: wgpu::Extent3d {
                width: size.0.max(1),
                height: size.1.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("drift distortion bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: ubo.as_entire_binding(),
                },
            ],
        });

        log::debug!("drift scene target resized to {}x{}", size.0, size.1);
        self.target = Some(SceneTarget { size, view, bind_group });
        Ok(())
    }

    pub(super) fn upload_texture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &RgbaImage,
    ) -> anyhow::Result<TextureId> {
        let (w, h) = image.dimensions();
        anyhow::ensure!(w > 0 && h > 0, "texture image is empty");
        let id = u32::try_from(self.textures.len()).context("texture id space exhausted")?;

        let size = wgpu::Extent3d { width: w, height: h, depth_or_array_layers: 1 };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("drift image texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * w),
                rows_per_image: Some(h),
            },
            size,
        );

        self.textures.push(Some(texture.create_view(&wgpu::TextureViewDescriptor::default())));
        Ok(TextureId(id))
    }

    pub(super) fn create_mesh(&mut self, device: &wgpu::Device, desc: MeshDesc) -> anyhow::Result<MeshId> {
        let view = self
            .textures
            .get(desc.texture.0 as usize)
            .and_then(Option::as_ref)
            .with_context(|| format!("mesh references unknown texture {:?}", desc.texture))?;
        let bgl = self.material_bgl.as_ref().context("material layout missing")?;
        let sampler = self.sampler.as_ref().context("sampler missing")?;

        let ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("drift material ubo"),
            size: std::mem::size_of::<MaterialUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("drift material bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: ubo.as_entire_binding() },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        self.grids.entry(desc.segments).or_insert_with(|| {
            let (vertices, indices) = plane_grid(desc.segments);
            GridBuffers {
                vbo: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("drift plane vbo"),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
                ibo: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("drift plane ibo"),
                    contents: bytemuck::cast_slice(&indices),
                    usage: wgpu::BufferUsages::INDEX,
                }),
                index_count: indices.len() as u32,
            }
        });

        let id = MeshId(self.next_mesh);
        self.next_mesh = self.next_mesh.checked_add(1).context("mesh id space exhausted")?;
        self.meshes.insert(
            id,
            GpuMesh {
                segments: desc.segments,
                ubo,
                bind_group,
                placement: None,
                uniforms: ImageUniforms::default(),
            },
        );
        Ok(id)
    }

    /// Uploads camera and per-mesh uniforms, then records the scene pass.
    pub(super) fn encode_scene(&self, queue: &wgpu::Queue, encoder: &mut wgpu::CommandEncoder) -> anyhow::Result<()> {
        let target = self.target.as_ref().context("scene target missing")?;
        let pipeline = self.image_pipeline.as_ref().context("image pipeline missing")?;
        let camera_ubo = self.camera_ubo.as_ref().context("camera ubo missing")?;
        let camera_bg = self.camera_bg.as_ref().context("camera bind group missing")?;

        let cam = CameraUniform { view_proj: self.camera.view_proj().to_cols_array_2d() };
        queue.write_buffer(camera_ubo, 0, bytemuck::bytes_of(&cam));

        let mut ids: Vec<&MeshId> = self.meshes.keys().collect();
        ids.sort_by_key(|id| id.0);

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("drift scene pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &target.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, camera_bg, &[]);

        for id in ids {
            let Some(mesh) = self.meshes.get(id) else { continue };
            let Some(placement) = mesh.placement else { continue };
            let Some(grid) = self.grids.get(&mesh.segments) else { continue };

            let u = MaterialUniform::new(placement, &mesh.uniforms);
            queue.write_buffer(&mesh.ubo, 0, bytemuck::bytes_of(&u));

            rpass.set_bind_group(1, &mesh.bind_group, &[]);
            rpass.set_vertex_buffer(0, grid.vbo.slice(..));
            rpass.set_index_buffer(grid.ibo.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..grid.index_count, 0, 0..1);
        }
        Ok(())
    }

    /// Records the distortion pass reading the scene target into `view`.
    pub(super) fn encode_distortion(
        &self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        uniforms: DistortionUniform,
    ) -> anyhow::Result<()> {
        let target = self.target.as_ref().context("scene target missing")?;
        let pipeline = self.distortion_pipeline.as_ref().context("distortion pipeline missing")?;
        let ubo = self.distortion_ubo.as_ref().context("distortion ubo missing")?;
        queue.write_buffer(ubo, 0, bytemuck::bytes_of(&uniforms));

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("drift distortion pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, &target.bind_group, &[]);
        rpass.draw(0..3, 0..1);
        Ok(())
    }
}

fn uniform_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    min_binding_size: Option<std::num::NonZeroU64>,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size,
        },
        count: None,
    }
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            multisampled: false,
            view_dimension: wgpu::TextureViewDimension::D2,
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}
