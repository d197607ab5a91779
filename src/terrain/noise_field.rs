//! Fractal noise height field
//!
//! Sums octaves of Perlin noise remapped to `[0, 1]`. Evaluation is pure:
//! the same coordinates and parameters always produce the same height.

use noise::{NoiseFn, Perlin};

use super::generator::TerrainParams;

/// Smooth 2D noise primitive with output in `[0, 1]`.
#[derive(Clone, Copy, Debug)]
pub struct UnitNoise {
    perlin: Perlin,
}

impl UnitNoise {
    pub fn new(seed: u32) -> Self {
        Self { perlin: Perlin::new(seed) }
    }

    /// Sample at `(x, y)`; continuous and deterministic.
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let v = self.perlin.get([x as f64, y as f64]);
        (((v + 1.0) * 0.5) as f32).clamp(0.0, 1.0)
    }
}

/// Layered noise producing a normalized height in `[0, 1]`.
#[derive(Clone, Debug)]
pub struct FractalNoise {
    noise: UnitNoise,
    scale: f32,
    octaves: u32,
    persistence: f32,
    lacunarity: f32,
    offset: [f32; 2],
}

impl FractalNoise {
    /// Build from terrain parameters. Assumes they have been validated.
    pub fn new(params: &TerrainParams) -> Self {
        Self {
            noise: UnitNoise::new(params.seed),
            scale: params.scale,
            octaves: params.octaves,
            persistence: params.persistence,
            lacunarity: params.lacunarity,
            offset: params.noise_offset,
        }
    }

    /// Normalized height at grid coordinates `(x, z)`.
    pub fn height(&self, x: f32, z: f32) -> f32 {
        let x = x + self.offset[0];
        let z = z + self.offset[1];

        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;

        for _ in 0..self.octaves {
            let sx = x / self.scale * frequency;
            let sz = z / self.scale * frequency;
            total += self.noise.sample(sx, sz) * amplitude;

            amplitude *= self.persistence;
            frequency *= self.lacunarity;
        }

        total.clamp(0.0, 1.0)
    }
}
