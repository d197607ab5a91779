//! Object scatterer: places decorative instances on a built terrain mesh.
//!
//! Walks the grid on a coarse stride, reads the per-vertex biome
//! classification the mesh builder stored, and admits a spawn with
//! probability `spawn_density * blend_weight²`. Never re-evaluates noise.

use std::f32::consts::TAU;

use glam::{Quat, Vec3};

use super::config::ScatterConfig;
use super::random::RandomSource;
use crate::terrain::biome::{BiomeDef, PrefabId};
use crate::terrain::mesh::TerrainMesh;

/// A decided placement, ready to hand to an object spawner.
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    pub prefab: PrefabId,
    /// World-space position (vertex position plus terrain world offset)
    pub position: Vec3,
    /// Up axis aligned to the surface normal, with a random yaw about it
    pub rotation: Quat,
    pub biome_index: usize,
    pub vertex_index: usize,
}

/// Per-pass counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScatterReport {
    pub samples: usize,
    pub out_of_range: usize,
    pub no_prefabs: usize,
    pub low_blend: usize,
    pub low_height: usize,
    pub failed_chance: usize,
    pub placed: usize,
}

/// Result of one scatter pass.
#[derive(Clone, Debug, Default)]
pub struct ScatterOutcome {
    pub placements: Vec<Placement>,
    pub report: ScatterReport,
}

/// Density-weighted stochastic placement over a terrain mesh.
pub struct ObjectScatterer<'a> {
    config: &'a ScatterConfig,
    biomes: &'a [BiomeDef],
    world_offset: Vec3,
}

impl<'a> ObjectScatterer<'a> {
    pub fn new(config: &'a ScatterConfig, biomes: &'a [BiomeDef], world_offset: Vec3) -> Self {
        Self {
            config,
            biomes,
            world_offset,
        }
    }

    /// Grid coordinates visited by the pass, snapped to the nearest vertex.
    ///
    /// Each vertex is visited at most once, so an interval below one grid
    /// unit visits every vertex exactly once.
    pub fn sample_points(&self, width: u32, depth: u32) -> impl Iterator<Item = (u32, u32)> {
        let xs = self.axis_indices(width);
        let zs = self.axis_indices(depth);
        zs.into_iter()
            .flat_map(move |z| xs.clone().into_iter().map(move |x| (x, z)))
    }

    /// Distinct snapped indices along one axis of `extent` cells, ascending.
    fn axis_indices(&self, extent: u32) -> Vec<u32> {
        let interval = self.config.check_interval;
        if interval < 1.0 {
            return (0..=extent).collect();
        }
        let steps = (extent as f32 / interval).floor() as u32;
        let mut indices: Vec<u32> = (0..=steps)
            .map(|i| ((i as f32 * interval).round() as u32).min(extent))
            .collect();
        indices.dedup();
        indices
    }

    /// Run one pass. Random draws per admitted sample, in order: spawn roll
    /// (skipped when chance is ignored), prefab pick, yaw.
    pub fn scatter<R>(&self, mesh: &TerrainMesh, rng: &mut R) -> ScatterOutcome
    where
        R: RandomSource + ?Sized,
    {
        let mut outcome = ScatterOutcome::default();
        let report = &mut outcome.report;

        for (x, z) in self.sample_points(mesh.width(), mesh.depth()) {
            report.samples += 1;
            let vertex_index = mesh.vertex_index(x, z);
            let (biome_index, blend) = mesh.attributes()[vertex_index].spawn_sample();

            let Some(biome) = self.biomes.get(biome_index) else {
                report.out_of_range += 1;
                continue;
            };
            if biome.spawn_prefabs.is_empty() {
                report.no_prefabs += 1;
                continue;
            }
            if blend < self.config.blend_threshold {
                report.low_blend += 1;
                continue;
            }
            let vertex = mesh.vertices()[vertex_index];
            if vertex.y < self.config.min_height {
                report.low_height += 1;
                continue;
            }

            let chance = biome.spawn_density * blend * blend;
            if !self.config.ignore_spawn_chance && rng.next_unit() >= chance {
                report.failed_chance += 1;
                continue;
            }

            let prefab = &biome.spawn_prefabs[rng.next_index(biome.spawn_prefabs.len())];
            let yaw = rng.next_unit() * TAU;
            let normal = mesh.normals()[vertex_index];
            let rotation = Quat::from_rotation_arc(Vec3::Y, normal) * Quat::from_rotation_y(yaw);

            log::trace!(
                "Placing '{}' at ({}, {}) in biome {} (blend {:.3})",
                prefab.as_str(), x, z, biome.name, blend
            );

            outcome.placements.push(Placement {
                prefab: prefab.clone(),
                position: vertex + self.world_offset,
                rotation,
                biome_index,
                vertex_index,
            });
            report.placed += 1;
        }

        outcome
    }
}
