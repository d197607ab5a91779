//! Island falloff map
//!
//! Edge attenuation subtracted from the base height so terrain sinks toward
//! the grid border. Uses Chebyshev distance from the grid center, which gives
//! a rounded-square silhouette.

/// Falloff at grid coordinates `(x, z)` on a `width` x `depth` grid.
///
/// Returns 0 at the center and 1 on the outer edge.
pub fn falloff_value(x: f32, z: f32, width: f32, depth: f32) -> f32 {
    let fx = 2.0 * x / width - 1.0;
    let fz = 2.0 * z / depth - 1.0;
    let v = fx.abs().max(fz.abs()).min(1.0);
    curve(v)
}

#[inline]
fn curve(v: f32) -> f32 {
    let a = v * v;
    let b = (1.0 - v) * (1.0 - v);
    a / (a + b)
}

/// Falloff values for every vertex of a grid, computed once per build.
#[derive(Clone, Debug)]
pub struct FalloffMap {
    width: u32,
    depth: u32,
    values: Vec<f32>,
}

impl FalloffMap {
    /// Precompute the map for a `width` x `depth` cell grid
    /// (`(width + 1) * (depth + 1)` samples, row-major by z).
    pub fn generate(width: u32, depth: u32) -> Self {
        let (w, d) = (width as f32, depth as f32);
        let mut values = Vec::with_capacity((width as usize + 1) * (depth as usize + 1));
        for z in 0..=depth {
            for x in 0..=width {
                values.push(falloff_value(x as f32, z as f32, w, d));
            }
        }
        Self { width, depth, values }
    }

    /// Value at grid vertex `(x, z)`. Coordinates are clamped to the grid.
    pub fn get(&self, x: u32, z: u32) -> f32 {
        let x = x.min(self.width) as usize;
        let z = z.min(self.depth) as usize;
        self.values[z * (self.width as usize + 1) + x]
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }
}
