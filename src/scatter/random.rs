//! Uniform random source consumed by the scatter pass.

use rand::Rng;

/// Minimal random capability: unit floats and bounded indices.
pub trait RandomSource {
    /// Uniform value in `[0, 1)`.
    fn next_unit(&mut self) -> f32;
    /// Uniform index in `[0, len)`. `len` must be non-zero.
    fn next_index(&mut self, len: usize) -> usize;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn next_unit(&mut self) -> f32 {
        self.random::<f32>()
    }

    fn next_index(&mut self, len: usize) -> usize {
        self.random_range(0..len)
    }
}
