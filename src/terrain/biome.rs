//! Biome classification over normalized temperature and moisture

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::math::clamp01;

/// Distance from a biome centroid at which the blend weight reaches 0.
pub const BLEND_MAX_DISTANCE: f32 = 0.3;

/// Opaque handle to an externally owned prefab asset.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrefabId(pub String);

impl PrefabId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PrefabId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Author-time biome definition. Read-only during generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiomeDef {
    pub name: String,
    pub min_temperature: f32,
    pub max_temperature: f32,
    pub min_moisture: f32,
    pub max_moisture: f32,
    /// Base spawn probability in `[0, 1]`
    pub spawn_density: f32,
    /// Prefabs picked uniformly when an object spawns in this biome
    pub spawn_prefabs: Vec<PrefabId>,
}

impl Default for BiomeDef {
    fn default() -> Self {
        Self {
            name: String::new(),
            min_temperature: 0.0,
            max_temperature: 1.0,
            min_moisture: 0.0,
            max_moisture: 1.0,
            spawn_density: 0.0,
            spawn_prefabs: Vec::new(),
        }
    }
}

impl BiomeDef {
    /// Create a biome covering the given temperature and moisture ranges.
    pub fn new(name: impl Into<String>, temperature: (f32, f32), moisture: (f32, f32)) -> Self {
        Self {
            name: name.into(),
            min_temperature: temperature.0,
            max_temperature: temperature.1,
            min_moisture: moisture.0,
            max_moisture: moisture.1,
            ..Default::default()
        }
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.spawn_density = density;
        self
    }

    pub fn with_prefabs<I, P>(mut self, prefabs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PrefabId>,
    {
        self.spawn_prefabs = prefabs.into_iter().map(Into::into).collect();
        self
    }

    /// Midpoint of the temperature and moisture ranges.
    pub fn centroid(&self) -> Vec2 {
        Vec2::new(
            (self.min_temperature + self.max_temperature) * 0.5,
            (self.min_moisture + self.max_moisture) * 0.5,
        )
    }

    /// Inclusive range test on both axes.
    pub fn contains(&self, temperature: f32, moisture: f32) -> bool {
        temperature >= self.min_temperature
            && temperature <= self.max_temperature
            && moisture >= self.min_moisture
            && moisture <= self.max_moisture
    }

    pub fn validate(&self) -> Result<()> {
        let unit = |v: f32| (0.0..=1.0).contains(&v);
        let ranges = [
            self.min_temperature,
            self.max_temperature,
            self.min_moisture,
            self.max_moisture,
        ];
        if !ranges.iter().all(|v| unit(*v)) {
            return Err(Error::invalid(format!(
                "biome '{}' ranges must lie in [0, 1]",
                self.name
            )));
        }
        if self.min_temperature > self.max_temperature || self.min_moisture > self.max_moisture {
            return Err(Error::invalid(format!(
                "biome '{}' has an inverted range",
                self.name
            )));
        }
        if !unit(self.spawn_density) {
            return Err(Error::invalid(format!(
                "biome '{}' spawn density {} outside [0, 1]",
                self.name, self.spawn_density
            )));
        }
        Ok(())
    }
}

/// How a sample picks its biome.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassificationMode {
    /// Closest range midpoint wins. Always defined for a non-empty list.
    #[default]
    NearestCentroid,
    /// First biome whose ranges contain the sample, index 0 when none does.
    FirstRangeMatch,
}

/// Result of classifying one sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BiomeSample {
    pub index: usize,
    /// 1 at the biome centroid, 0 at or beyond [`BLEND_MAX_DISTANCE`]
    pub blend_weight: f32,
}

/// Maps `(temperature, moisture)` samples to biome indices and blend weights.
pub struct BiomeClassifier<'a> {
    biomes: &'a [BiomeDef],
    centroids: Vec<Vec2>,
    mode: ClassificationMode,
}

impl<'a> BiomeClassifier<'a> {
    /// Create a classifier. The biome list must be non-empty.
    pub fn new(biomes: &'a [BiomeDef]) -> Result<Self> {
        Self::with_mode(biomes, ClassificationMode::default())
    }

    pub fn with_mode(biomes: &'a [BiomeDef], mode: ClassificationMode) -> Result<Self> {
        if biomes.is_empty() {
            return Err(Error::EmptyBiomeList);
        }
        let centroids = biomes.iter().map(BiomeDef::centroid).collect();
        Ok(Self { biomes, centroids, mode })
    }

    /// Number of biomes, used to normalize indices.
    pub(crate) fn len(&self) -> usize {
        self.biomes.len()
    }

    /// Classify a normalized sample. Deterministic for a given biome list.
    pub fn classify(&self, temperature: f32, moisture: f32) -> BiomeSample {
        let point = Vec2::new(temperature, moisture);
        let index = match self.mode {
            ClassificationMode::NearestCentroid => self.nearest(point),
            ClassificationMode::FirstRangeMatch => self
                .biomes
                .iter()
                .position(|b| b.contains(temperature, moisture))
                .unwrap_or(0),
        };
        let distance = point.distance(self.centroids[index]);
        BiomeSample {
            index,
            blend_weight: blend_weight(distance),
        }
    }

    // Ties keep the earlier biome.
    fn nearest(&self, point: Vec2) -> usize {
        let mut best = 0;
        let mut best_dist = f32::INFINITY;
        for (i, c) in self.centroids.iter().enumerate() {
            let d = point.distance_squared(*c);
            if d < best_dist {
                best = i;
                best_dist = d;
            }
        }
        best
    }
}

/// Blend weight for a distance from the nearest centroid.
#[inline]
pub fn blend_weight(distance: f32) -> f32 {
    clamp01(1.0 - distance / BLEND_MAX_DISTANCE)
}

/// Encode a biome index into `[0, 1]`. A single biome encodes as 0.
pub fn normalize_index(index: usize, biome_count: usize) -> f32 {
    if biome_count > 1 {
        index as f32 / (biome_count - 1) as f32
    } else {
        0.0
    }
}

/// Inverse of [`normalize_index`].
pub fn denormalize_index(value: f32, biome_count: usize) -> usize {
    if biome_count > 1 {
        (value * (biome_count - 1) as f32).round().max(0.0) as usize
    } else {
        0
    }
}
