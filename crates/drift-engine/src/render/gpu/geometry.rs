use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(super) struct PlaneVertex {
    pub pos: [f32; 2], // [-0.5, 0.5]
    pub uv: [f32; 2],  // top-left origin
}

impl PlaneVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2, // pos
        1 => Float32x2  // uv
    ];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PlaneVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Unit plane subdivided into `segments × segments` quads.
///
/// Row 0 of the grid is the top edge (`uv.y = 0`, `pos.y = 0.5`).
pub(super) fn plane_grid(segments: u32) -> (Vec<PlaneVertex>, Vec<u32>) {
    let n = segments.clamp(1, 256);
    let step = 1.0 / n as f32;

    let mut vertices = Vec::with_capacity(((n + 1) * (n + 1)) as usize);
    for row in 0..=n {
        for col in 0..=n {
            let u = col as f32 * step;
            let v = row as f32 * step;
            vertices.push(PlaneVertex { pos: [u - 0.5, 0.5 - v], uv: [u, v] });
        }
    }

    let stride = n + 1;
    let mut indices = Vec::with_capacity((n * n * 6) as usize);
    for row in 0..n {
        for col in 0..n {
            let tl = row * stride + col;
            let tr = tl + 1;
            let bl = tl + stride;
            let br = bl + 1;
            // counter-clockwise in scene space (+Y up)
            indices.extend_from_slice(&[tl, bl, br, tl, br, tr]);
        }
    }
    (vertices, indices)
}
