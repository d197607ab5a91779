//! Procedural terrain: height field stages, biome classification and mesh building

pub mod noise_field;
pub mod falloff;
pub mod river;
pub mod biome;
pub mod mesh;
pub mod generator;

pub use noise_field::{FractalNoise, UnitNoise};
pub use falloff::{falloff_value, FalloffMap};
pub use river::{RiverCarver, RiverParams, RIVER_EPSILON};
pub use biome::{BiomeClassifier, BiomeDef, BiomeSample, ClassificationMode, PrefabId, BLEND_MAX_DISTANCE};
pub use mesh::{GpuVertex, TerrainMesh, VertexAttribute, RIVER_COLOR};
pub use generator::{TerrainGenerator, TerrainParams};
