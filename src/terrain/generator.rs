//! Height field evaluation and mesh building

use std::time::Instant;

use glam::Vec3;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::biome::BiomeClassifier;
use super::falloff::{falloff_value, FalloffMap};
use super::mesh::{grid_vertex_count, TerrainMesh, VertexAttribute};
use super::noise_field::FractalNoise;
use super::river::{is_river, RiverCarver, RiverParams};
use crate::core::{Error, Result};
use crate::math::{clamp01, inverse_lerp};

/// Parameters controlling the grid and its height noise
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    pub width: u32,             // Cells along x
    pub depth: u32,             // Cells along z
    pub scale: f32,             // Noise sampling denominator (larger = smoother)
    pub height_multiplier: f32, // Vertical scale
    pub octaves: u32,           // FBM octaves (detail levels)
    pub persistence: f32,       // FBM persistence (0.5 typical)
    pub lacunarity: f32,        // FBM lacunarity (2.0 typical)
    pub noise_offset: [f32; 2], // Added to (x, z) before scaling
    pub seed: u32,              // Perlin permutation seed
    pub parallel: bool,         // Evaluate vertices on the rayon pool
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            width: 100,
            depth: 100,
            scale: 20.0,
            height_multiplier: 5.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            noise_offset: [0.0, 0.0],
            seed: 0,
            parallel: true,
        }
    }
}

impl TerrainParams {
    /// Reject parameters that would produce degenerate buffers or undefined noise.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.depth == 0 {
            return Err(Error::InvalidDimensions {
                width: self.width,
                depth: self.depth,
            });
        }
        if grid_vertex_count(self.width, self.depth) > u32::MAX as usize {
            return Err(Error::invalid(format!(
                "grid {}x{} has too many vertices for 32-bit indices",
                self.width, self.depth
            )));
        }
        if self.scale == 0.0 || !self.scale.is_finite() {
            return Err(Error::ZeroScale);
        }
        if self.octaves < 1 {
            return Err(Error::invalid("octaves must be at least 1"));
        }
        let finite = [
            self.height_multiplier,
            self.persistence,
            self.lacunarity,
            self.noise_offset[0],
            self.noise_offset[1],
        ];
        if !finite.iter().all(|v| v.is_finite()) {
            return Err(Error::invalid("noise parameters must be finite"));
        }
        Ok(())
    }
}

/// Composes noise, falloff, river carving and biome classification into
/// a terrain mesh.
pub struct TerrainGenerator<'a> {
    params: TerrainParams,
    noise: FractalNoise,
    rivers: RiverCarver,
    classifier: BiomeClassifier<'a>,
}

impl<'a> TerrainGenerator<'a> {
    /// Create a generator. Fails on invalid terrain or river parameters.
    pub fn new(
        params: TerrainParams,
        rivers: RiverParams,
        classifier: BiomeClassifier<'a>,
    ) -> Result<Self> {
        params.validate()?;
        rivers.validate()?;

        let noise = FractalNoise::new(&params);
        let rivers = RiverCarver::new(rivers, params.seed, params.width as f32);

        Ok(Self {
            params,
            noise,
            rivers,
            classifier,
        })
    }

    pub fn rivers(&self) -> &RiverCarver {
        &self.rivers
    }

    /// Final terrain height at grid coordinates `(x, z)`.
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        let (w, d) = (self.params.width as f32, self.params.depth as f32);
        self.shaped_height(x, z, falloff_value(x, z, w, d)) - self.rivers.offset(x, z)
    }

    fn shaped_height(&self, x: f32, z: f32, falloff: f32) -> f32 {
        clamp01(self.noise.height(x, z) - falloff) * self.params.height_multiplier
    }

    fn evaluate_vertex(&self, x: u32, z: u32, falloff: &FalloffMap) -> (Vec3, VertexAttribute) {
        let (xf, zf) = (x as f32, z as f32);

        let carve = self.rivers.offset(xf, zf);
        let height = self.shaped_height(xf, zf, falloff.get(x, z)) - carve;

        let temperature = inverse_lerp(0.0, self.params.width as f32, xf);
        let moisture = inverse_lerp(0.0, self.params.depth as f32, zf);
        let sample = self.classifier.classify(temperature, moisture);

        let attribute = VertexAttribute {
            biome_index: sample.index,
            blend_weight: sample.blend_weight,
            river: is_river(carve),
        };
        (Vec3::new(xf, height, zf), attribute)
    }

    /// Build the full mesh. Every call rebuilds from scratch.
    pub fn build_mesh(&self) -> TerrainMesh {
        let start = Instant::now();
        let (width, depth) = (self.params.width, self.params.depth);
        let row = width as usize + 1;
        let count = grid_vertex_count(width, depth);

        let falloff = FalloffMap::generate(width, depth);

        let evaluate = |i: usize| {
            let x = (i % row) as u32;
            let z = (i / row) as u32;
            self.evaluate_vertex(x, z, &falloff)
        };
        let samples: Vec<(Vec3, VertexAttribute)> = if self.params.parallel {
            (0..count).into_par_iter().map(evaluate).collect()
        } else {
            (0..count).map(evaluate).collect()
        };
        let (vertices, attributes): (Vec<Vec3>, Vec<VertexAttribute>) =
            samples.into_iter().unzip();
        let evaluated = start.elapsed();

        let mesh = TerrainMesh::from_parts(width, depth, vertices, attributes, self.classifier.len());

        log::debug!(
            "Built {}x{} terrain mesh: {} vertices, {} triangles, {} river vertices (eval {:.2?}, total {:.2?})",
            width,
            depth,
            mesh.vertex_count(),
            mesh.triangle_count(),
            mesh.river_vertex_count(),
            evaluated,
            start.elapsed(),
        );

        mesh
    }
}
