//! Terrain generation pipeline: builds the mesh, then scatters objects on it.
//!
//! The pipeline orchestrates:
//! 1. Configuration validation (before any buffer is allocated)
//! 2. Mesh building (noise, falloff, rivers, biome classification)
//! 3. Handing the finished mesh to render and collision collaborators
//! 4. Destroying the previous instance set and scattering a new one

pub mod config;
pub mod host;
pub mod trigger;

pub use config::{default_biomes, GenerationConfig};
pub use host::{CollisionRegistrar, ObjectSpawner, RecordingHost, RenderTarget, TerrainHost};
pub use trigger::RegenerateTrigger;

use std::time::Instant;

use crate::core::{Error, Result};
use crate::math::Aabb;
use crate::scatter::{ObjectScatterer, Placement, RandomSource, ScatterOutcome, ScatterReport};
use crate::terrain::biome::BiomeClassifier;
use crate::terrain::generator::TerrainGenerator;
use crate::terrain::mesh::TerrainMesh;

/// A validated configuration ready to build meshes and scatter passes.
pub struct GenerationPipeline<'a> {
    config: &'a GenerationConfig,
    generator: TerrainGenerator<'a>,
}

impl<'a> GenerationPipeline<'a> {
    /// Create a new pipeline from configuration. Fails on any precondition violation.
    pub fn new(config: &'a GenerationConfig) -> Result<Self> {
        config.validate()?;
        let classifier = BiomeClassifier::with_mode(&config.biomes, config.classification)?;
        let generator = TerrainGenerator::new(
            config.terrain.clone(),
            config.rivers.clone(),
            classifier,
        )?;
        Ok(Self { config, generator })
    }

    pub fn config(&self) -> &GenerationConfig {
        self.config
    }

    /// Get terrain height at grid coordinates (delegates to TerrainGenerator).
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        self.generator.height_at(x, z)
    }

    pub fn build_mesh(&self) -> TerrainMesh {
        self.generator.build_mesh()
    }

    /// Scatter objects over `mesh` using this pipeline's biomes and scatter settings.
    pub fn scatter<R>(&self, mesh: &TerrainMesh, rng: &mut R) -> ScatterOutcome
    where
        R: RandomSource + ?Sized,
    {
        ObjectScatterer::new(&self.config.scatter, &self.config.biomes, self.config.world_offset())
            .scatter(mesh, rng)
    }
}

/// Mesh build lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BuildState {
    #[default]
    Idle,
    Building,
    Built,
}

/// A placed object owned by the terrain.
#[derive(Clone, Debug)]
pub struct SpawnedInstance<H> {
    pub handle: H,
    pub placement: Placement,
}

/// What a regeneration produced.
#[derive(Clone, Debug, PartialEq)]
pub struct RegenerationSummary {
    pub vertex_count: usize,
    pub triangle_count: usize,
    pub river_vertex_count: usize,
    /// World-space bounds of the new mesh
    pub bounds: Aabb,
    /// Instances destroyed from the previous pass
    pub destroyed: usize,
    pub scatter: ScatterReport,
}

/// Owns the current mesh and the instances spawned on it.
///
/// Every regeneration discards both and rebuilds them from scratch. A
/// regeneration that fails validation leaves the previous mesh and
/// instances in place.
pub struct Terrain<H> {
    mesh: Option<TerrainMesh>,
    spawned: Vec<SpawnedInstance<H>>,
    state: BuildState,
}

impl<H> Default for Terrain<H> {
    fn default() -> Self {
        Self {
            mesh: None,
            spawned: Vec::new(),
            state: BuildState::Idle,
        }
    }
}

impl<H> Terrain<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    /// The current mesh, once built.
    pub fn mesh(&self) -> Option<&TerrainMesh> {
        self.mesh.as_ref()
    }

    pub fn spawned(&self) -> &[SpawnedInstance<H>] {
        &self.spawned
    }

    /// Rebuild the mesh and re-scatter objects.
    ///
    /// The new mesh reaches `host` only once complete; previous instances are
    /// destroyed before the new scatter pass.
    pub fn regenerate<S, R>(
        &mut self,
        config: &GenerationConfig,
        host: &mut S,
        rng: &mut R,
    ) -> Result<RegenerationSummary>
    where
        S: TerrainHost<Handle = H>,
        R: RandomSource + ?Sized,
    {
        let start = Instant::now();
        let pipeline = GenerationPipeline::new(config)?;

        self.state = BuildState::Building;
        let mesh = pipeline.build_mesh();
        host.bind_mesh(&mesh, config.material.as_deref());
        host.register_surface(&mesh);
        let built = start.elapsed();

        let vertex_count = mesh.vertex_count();
        let triangle_count = mesh.triangle_count();
        let river_vertex_count = mesh.river_vertex_count();
        let bounds = mesh.bounds().translated(config.world_offset());
        self.mesh = Some(mesh);
        self.state = BuildState::Built;

        let (destroyed, scatter) = self.respawn(&pipeline, host, rng)?;

        log::info!(
            "Regenerated {}x{} terrain: {} vertices, {} triangles, {} objects placed ({} destroyed) in {:.2?}",
            config.terrain.width,
            config.terrain.depth,
            vertex_count,
            triangle_count,
            scatter.placed,
            destroyed,
            start.elapsed(),
        );
        log::debug!("Mesh build took {:.2?}; scatter report: {:?}", built, scatter);

        Ok(RegenerationSummary {
            vertex_count,
            triangle_count,
            river_vertex_count,
            bounds,
            destroyed,
            scatter,
        })
    }

    /// Regenerate if `trigger` is armed, consuming the request.
    pub fn poll<S, R>(
        &mut self,
        trigger: &mut RegenerateTrigger,
        config: &GenerationConfig,
        host: &mut S,
        rng: &mut R,
    ) -> Result<Option<RegenerationSummary>>
    where
        S: TerrainHost<Handle = H>,
        R: RandomSource + ?Sized,
    {
        if !trigger.take() {
            return Ok(None);
        }
        self.regenerate(config, host, rng).map(Some)
    }

    /// Replace the spawned set on the current mesh without rebuilding it.
    pub fn rescatter<S, R>(
        &mut self,
        config: &GenerationConfig,
        host: &mut S,
        rng: &mut R,
    ) -> Result<ScatterReport>
    where
        S: ObjectSpawner<Handle = H>,
        R: RandomSource + ?Sized,
    {
        let pipeline = GenerationPipeline::new(config)?;
        let (destroyed, report) = self.respawn(&pipeline, host, rng)?;
        log::debug!("Rescattered: {} destroyed, {} placed", destroyed, report.placed);
        Ok(report)
    }

    /// Destroy every spawned instance.
    pub fn clear_spawned<S>(&mut self, host: &mut S) -> usize
    where
        S: ObjectSpawner<Handle = H>,
    {
        let count = self.spawned.len();
        for instance in self.spawned.drain(..) {
            host.destroy(instance.handle);
        }
        count
    }

    fn respawn<S, R>(
        &mut self,
        pipeline: &GenerationPipeline<'_>,
        host: &mut S,
        rng: &mut R,
    ) -> Result<(usize, ScatterReport)>
    where
        S: ObjectSpawner<Handle = H>,
        R: RandomSource + ?Sized,
    {
        let Some(mesh) = self.mesh.as_ref() else {
            return Err(Error::NotBuilt);
        };
        let outcome = pipeline.scatter(mesh, rng);

        let destroyed = self.clear_spawned(host);

        if outcome.report.placed == 0 && pipeline.config().biomes.iter().all(|b| b.spawn_prefabs.is_empty()) {
            log::warn!("No biome has spawn prefabs; scatter pass placed nothing");
        }

        self.spawned = outcome
            .placements
            .into_iter()
            .map(|placement| SpawnedInstance {
                handle: host.spawn(&placement),
                placement,
            })
            .collect();

        Ok((destroyed, outcome.report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::biome::BiomeDef;
    use crate::terrain::generator::TerrainParams;
    use crate::terrain::river::RiverParams;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn small_config() -> GenerationConfig {
        GenerationConfig {
            terrain: TerrainParams {
                width: 2,
                depth: 2,
                octaves: 1,
                persistence: 0.5,
                lacunarity: 2.0,
                height_multiplier: 1.0,
                ..Default::default()
            },
            rivers: RiverParams { count: 0, ..Default::default() },
            biomes: vec![BiomeDef::new("all", (0.0, 1.0), (0.0, 1.0))
                .with_density(0.0)
                .with_prefabs(["rock"])],
            ..Default::default()
        }
    }

    fn lush_config() -> GenerationConfig {
        let mut config = GenerationConfig::from_terrain(TerrainParams {
            width: 40,
            depth: 40,
            height_multiplier: 10.0,
            ..Default::default()
        });
        config.scatter.check_interval = 1.0;
        config.scatter.min_height = 0.0;
        config.scatter.blend_threshold = 0.0;
        config.scatter.ignore_spawn_chance = true;
        config
    }

    #[test]
    fn test_small_scenario() {
        let mut config = small_config();
        config.scatter.min_height = 0.0;
        config.scatter.blend_threshold = 0.0;
        config.scatter.check_interval = 1.0;
        let mut terrain = Terrain::new();
        let mut host = RecordingHost::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let summary = terrain.regenerate(&config, &mut host, &mut rng).unwrap();
        assert_eq!(summary.vertex_count, 9);
        assert_eq!(summary.triangle_count, 8);
        assert_eq!(terrain.mesh().unwrap().indices().len(), 24);
        assert_eq!(summary.scatter.samples, 9);
        assert_eq!(summary.scatter.failed_chance, summary.scatter.samples);
        assert_eq!(summary.scatter.placed, 0);
        assert!(terrain.spawned().is_empty());
        assert_eq!(host.live_count(), 0);
        assert_eq!(terrain.state(), BuildState::Built);
    }

    #[test]
    fn test_mesh_handed_to_collaborators() {
        let mut config = small_config();
        config.material = Some("island_array".to_string());
        let mut terrain = Terrain::new();
        let mut host = RecordingHost::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        terrain.regenerate(&config, &mut host, &mut rng).unwrap();
        assert_eq!(host.bind_count, 1);
        assert_eq!(host.collision_count, 1);
        assert_eq!(host.bound_vertices, 9);
        assert_eq!(host.bound_material.as_deref(), Some("island_array"));
    }

    #[test]
    fn test_invalid_config_leaves_previous_state() {
        let config = lush_config();
        let mut terrain = Terrain::new();
        let mut host = RecordingHost::new();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        terrain.regenerate(&config, &mut host, &mut rng).unwrap();
        let spawned = terrain.spawned().len();
        let vertices = terrain.mesh().unwrap().vertices().to_vec();

        let mut bad = config.clone();
        bad.terrain.width = 0;
        let err = terrain.regenerate(&bad, &mut host, &mut rng).unwrap_err();
        assert!(matches!(err, Error::InvalidDimensions { .. }));

        assert_eq!(terrain.state(), BuildState::Built);
        assert_eq!(terrain.mesh().unwrap().vertices(), &vertices[..]);
        assert_eq!(terrain.spawned().len(), spawned);
        assert_eq!(host.live_count(), spawned);
        assert_eq!(host.bind_count, 1);
    }

    #[test]
    fn test_empty_biomes_rejected_before_build() {
        let mut config = small_config();
        config.biomes.clear();
        let mut terrain: Terrain<u64> = Terrain::new();
        let mut host = RecordingHost::new();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let err = terrain.regenerate(&config, &mut host, &mut rng).unwrap_err();
        assert!(matches!(err, Error::EmptyBiomeList));
        assert!(terrain.mesh().is_none());
        assert_eq!(terrain.state(), BuildState::Idle);
        assert_eq!(host.bind_count, 0);
    }

    #[test]
    fn test_regenerate_replaces_all_instances() {
        let config = lush_config();
        let mut terrain = Terrain::new();
        let mut host = RecordingHost::new();
        let mut rng = ChaCha8Rng::seed_from_u64(4);

        let first = terrain.regenerate(&config, &mut host, &mut rng).unwrap();
        assert!(first.scatter.placed > 0);
        assert_eq!(first.destroyed, 0);
        assert_eq!(host.live_count(), first.scatter.placed);

        let second = terrain.regenerate(&config, &mut host, &mut rng).unwrap();
        assert_eq!(second.destroyed, first.scatter.placed);
        assert_eq!(host.destroyed, first.scatter.placed);
        assert_eq!(host.live_count(), second.scatter.placed);
        assert_eq!(terrain.spawned().len(), second.scatter.placed);
    }

    #[test]
    fn test_regeneration_reproducible_with_seed() {
        let config = lush_config();
        let mut host = RecordingHost::new();

        let mut a = Terrain::new();
        a.regenerate(&config, &mut host, &mut ChaCha8Rng::seed_from_u64(11)).unwrap();
        let mut b = Terrain::new();
        b.regenerate(&config, &mut host, &mut ChaCha8Rng::seed_from_u64(11)).unwrap();

        let (ma, mb) = (a.mesh().unwrap(), b.mesh().unwrap());
        assert_eq!(ma.vertices(), mb.vertices());
        assert_eq!(ma.indices(), mb.indices());
        assert_eq!(ma.colors(), mb.colors());

        let pa: Vec<_> = a.spawned().iter().map(|s| s.placement.clone()).collect();
        let pb: Vec<_> = b.spawned().iter().map(|s| s.placement.clone()).collect();
        assert_eq!(pa, pb);
    }

    #[test]
    fn test_trigger_runs_once() {
        let config = small_config();
        let mut terrain = Terrain::new();
        let mut host = RecordingHost::new();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut trigger = RegenerateTrigger::new();

        assert!(terrain.poll(&mut trigger, &config, &mut host, &mut rng).unwrap().is_none());
        assert!(terrain.mesh().is_none());

        trigger.arm();
        let summary = terrain.poll(&mut trigger, &config, &mut host, &mut rng).unwrap();
        assert!(summary.is_some());
        assert!(terrain.poll(&mut trigger, &config, &mut host, &mut rng).unwrap().is_none());
        assert_eq!(host.bind_count, 1);
    }

    #[test]
    fn test_rescatter_requires_mesh() {
        let config = lush_config();
        let mut terrain: Terrain<u64> = Terrain::new();
        let mut host = RecordingHost::new();
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        assert!(matches!(
            terrain.rescatter(&config, &mut host, &mut rng),
            Err(Error::NotBuilt)
        ));
    }

    #[test]
    fn test_rescatter_with_shorter_biome_list_skips_out_of_range() {
        let config = lush_config();
        let mut terrain = Terrain::new();
        let mut host = RecordingHost::new();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        terrain.regenerate(&config, &mut host, &mut rng).unwrap();

        let mut fewer = config.clone();
        fewer.biomes.truncate(1);
        let report = terrain.rescatter(&fewer, &mut host, &mut rng).unwrap();
        assert!(report.out_of_range > 0);
        assert_eq!(host.live_count(), report.placed);
        assert_eq!(host.bind_count, 1);
    }

    #[test]
    fn test_world_offset_applied() {
        let mut config = lush_config();
        config.world_offset = [500.0, 2.0, -250.0];
        let mut terrain = Terrain::new();
        let mut host = RecordingHost::new();
        let mut rng = ChaCha8Rng::seed_from_u64(8);

        let summary = terrain.regenerate(&config, &mut host, &mut rng).unwrap();
        assert_eq!(summary.bounds.min.x, 500.0);
        assert_eq!(summary.bounds.min.z, -250.0);
        for p in host.live() {
            assert!(p.position.x >= 500.0 && p.position.x <= 540.0);
        }
    }

    #[test]
    fn test_pipeline_height_matches_mesh() {
        let config = lush_config();
        let pipeline = GenerationPipeline::new(&config).unwrap();
        let mesh = pipeline.build_mesh();
        let v = mesh.vertices()[mesh.vertex_index(12, 30)];
        assert_eq!(pipeline.height_at(12.0, 30.0), v.y);
    }
}
