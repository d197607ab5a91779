//! Islegen - procedural island terrain meshes with biome-driven object scattering

pub mod core;
pub mod math;
pub mod terrain;
pub mod scatter;
pub mod generation;
