//! Generation configuration: every author-time parameter in one place.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::scatter::ScatterConfig;
use crate::terrain::biome::{BiomeDef, ClassificationMode};
use crate::terrain::generator::TerrainParams;
use crate::terrain::river::RiverParams;

/// Configuration for the terrain generation pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Grid dimensions and height noise.
    pub terrain: TerrainParams,
    /// River channels carved into the height field.
    pub rivers: RiverParams,
    /// Ordered biome list. Must be non-empty.
    pub biomes: Vec<BiomeDef>,
    /// How vertices pick their biome.
    pub classification: ClassificationMode,
    /// Object scatter parameters.
    pub scatter: ScatterConfig,
    /// World position of the terrain origin; added to spawned instance positions.
    pub world_offset: [f32; 3],
    /// Material bound alongside the mesh, when configured.
    pub material: Option<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            terrain: TerrainParams::default(),
            rivers: RiverParams::default(),
            biomes: default_biomes(),
            classification: ClassificationMode::default(),
            scatter: ScatterConfig::default(),
            world_offset: [0.0; 3],
            material: None,
        }
    }
}

/// Four quadrant biomes spanning the temperature/moisture square.
pub fn default_biomes() -> Vec<BiomeDef> {
    vec![
        BiomeDef::new("tundra", (0.0, 0.5), (0.0, 0.5))
            .with_density(0.05)
            .with_prefabs(["boulder", "frozen_shrub"]),
        BiomeDef::new("desert", (0.5, 1.0), (0.0, 0.5))
            .with_density(0.05)
            .with_prefabs(["cactus", "dry_rock"]),
        BiomeDef::new("forest", (0.0, 0.5), (0.5, 1.0))
            .with_density(0.6)
            .with_prefabs(["pine_tree", "fir_tree", "fallen_log"]),
        BiomeDef::new("grassland", (0.5, 1.0), (0.5, 1.0))
            .with_density(0.2)
            .with_prefabs(["bush", "flower_patch"]),
    ]
}

impl GenerationConfig {
    /// Create from terrain params with default rivers, biomes and scatter.
    pub fn from_terrain(terrain: TerrainParams) -> Self {
        Self {
            terrain,
            ..Default::default()
        }
    }

    pub fn world_offset(&self) -> Vec3 {
        Vec3::from_array(self.world_offset)
    }

    /// Check every precondition before any buffer is allocated.
    pub fn validate(&self) -> Result<()> {
        self.terrain.validate()?;
        self.rivers.validate()?;
        if self.biomes.is_empty() {
            return Err(Error::EmptyBiomeList);
        }
        for biome in &self.biomes {
            biome.validate()?;
        }
        self.scatter.validate()?;
        if !self.world_offset.iter().all(|v| v.is_finite()) {
            return Err(Error::invalid("world offset must be finite"));
        }
        Ok(())
    }

    /// Load from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        if config.biomes.is_empty() {
            log::warn!("Config {} defines no biomes; generation will be rejected", path.display());
        }
        Ok(config)
    }

    /// Save as pretty JSON, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = GenerationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.biomes.len(), 4);
        assert_eq!(config.classification, ClassificationMode::NearestCentroid);
    }

    #[test]
    fn test_rejects_empty_biomes() {
        let config = GenerationConfig { biomes: Vec::new(), ..Default::default() };
        assert!(matches!(config.validate(), Err(Error::EmptyBiomeList)));
    }

    #[test]
    fn test_rejects_bad_nested_params() {
        let mut config = GenerationConfig::default();
        config.terrain.scale = 0.0;
        assert!(matches!(config.validate(), Err(Error::ZeroScale)));

        let mut config = GenerationConfig::default();
        config.scatter.check_interval = 0.0;
        assert!(config.validate().is_err());

        let mut config = GenerationConfig::default();
        config.biomes[1].max_moisture = 2.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("island.json");

        let mut config = GenerationConfig::from_terrain(TerrainParams {
            width: 64,
            depth: 48,
            seed: 7,
            ..Default::default()
        });
        config.material = Some("terrain_array".to_string());
        config.world_offset = [10.0, 0.0, -5.0];
        config.save(&path).unwrap();

        let loaded = GenerationConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        std::fs::write(&path, r#"{ "terrain": { "width": 8, "depth": 6 }, "rivers": { "count": 0 } }"#).unwrap();

        let config = GenerationConfig::load(&path).unwrap();
        assert_eq!(config.terrain.width, 8);
        assert_eq!(config.terrain.depth, 6);
        assert_eq!(config.terrain.octaves, TerrainParams::default().octaves);
        assert_eq!(config.rivers.count, 0);
        assert_eq!(config.biomes, default_biomes());
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            GenerationConfig::load(&dir.path().join("missing.json")),
            Err(Error::Io(_))
        ));

        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(GenerationConfig::load(&path), Err(Error::Json(_))));
    }

    #[test]
    fn test_prefab_ids_serialize_as_strings() {
        let json = serde_json::to_value(&default_biomes()[0]).unwrap();
        assert_eq!(json["spawn_prefabs"][0], "boulder");
    }
}
