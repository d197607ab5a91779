//! Decorative object scattering over a built terrain mesh.
//!
//! Placement reads the biome classification stored on the mesh and draws
//! from a caller-supplied random source, so a pass is reproducible only when
//! that source is reseeded identically.

pub mod config;
pub mod random;
pub mod scatterer;

pub use config::ScatterConfig;
pub use random::RandomSource;
pub use scatterer::{ObjectScatterer, Placement, ScatterOutcome, ScatterReport};
