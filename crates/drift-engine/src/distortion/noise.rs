/// Smooth 3D noise field with output in `[-1, 1]`.
pub trait Noise3 {
    fn sample(&self, x: f64, y: f64, z: f64) -> f64;
}

impl<F> Noise3 for F
where
    F: Fn(f64, f64, f64) -> f64,
{
    fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        self(x, y, z)
    }
}

/// Hash-lattice gradient noise.
///
/// Integer-only hashing keeps the field identical to the WGSL port in
/// `distortion.wgsl` for seed 0; change both together.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct GradientNoise {
    seed: u32,
}

impl GradientNoise {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }
}

const GRADIENTS: [[f64; 3]; 12] = [
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [1.0, -1.0, 0.0],
    [-1.0, -1.0, 0.0],
    [1.0, 0.0, 1.0],
    [-1.0, 0.0, 1.0],
    [1.0, 0.0, -1.0],
    [-1.0, 0.0, -1.0],
    [0.0, 1.0, 1.0],
    [0.0, -1.0, 1.0],
    [0.0, 1.0, -1.0],
    [0.0, -1.0, -1.0],
];

#[inline]
fn hash3(x: u32, y: u32, z: u32, seed: u32) -> u32 {
    let mut h = x.wrapping_mul(0x8da6_b343)
        ^ y.wrapping_mul(0xd816_3841)
        ^ z.wrapping_mul(0xcb1a_b31f)
        ^ seed;
    h = (h ^ (h >> 16)).wrapping_mul(0x7feb_352d);
    h = (h ^ (h >> 15)).wrapping_mul(0x846c_a68b);
    h ^ (h >> 16)
}

#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

impl GradientNoise {
    #[inline]
    fn corner(&self, cell: [u32; 3], offset: [u32; 3], d: [f64; 3]) -> f64 {
        let h = hash3(
            cell[0].wrapping_add(offset[0]),
            cell[1].wrapping_add(offset[1]),
            cell[2].wrapping_add(offset[2]),
            self.seed,
        );
        let g = GRADIENTS[(h % 12) as usize];
        g[0] * (d[0] - offset[0] as f64) + g[1] * (d[1] - offset[1] as f64) + g[2] * (d[2] - offset[2] as f64)
    }
}

impl Noise3 for GradientNoise {
    fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        if !(x.is_finite() && y.is_finite() && z.is_finite()) {
            return 0.0;
        }
        let (fx, fy, fz) = (x.floor(), y.floor(), z.floor());
        // Two's-complement wrap so negative cells hash like the shader's i32 → u32.
        let cell = [fx as i64 as u32, fy as i64 as u32, fz as i64 as u32];
        let d = [x - fx, y - fy, z - fz];
        let (u, v, w) = (fade(d[0]), fade(d[1]), fade(d[2]));

        let c = |ox, oy, oz| self.corner(cell, [ox, oy, oz], d);
        let x00 = lerp(c(0, 0, 0), c(1, 0, 0), u);
        let x10 = lerp(c(0, 1, 0), c(1, 1, 0), u);
        let x01 = lerp(c(0, 0, 1), c(1, 0, 1), u);
        let x11 = lerp(c(0, 1, 1), c(1, 1, 1), u);
        let y0 = lerp(x00, x10, v);
        let y1 = lerp(x01, x11, v);
        lerp(y0, y1, w).clamp(-1.0, 1.0)
    }
}
