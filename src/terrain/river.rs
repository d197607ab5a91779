//! River carving
//!
//! Each channel follows a meandering center line `x = center(z)` driven by
//! noise. Depth falls off with horizontal distance from that line and
//! channels add together, so crossings carve deeper.

use serde::{Deserialize, Serialize};

use super::noise_field::UnitNoise;
use crate::core::{Error, Result};
use crate::math::{inverse_lerp, smoothstep};

/// Carve offset above which a vertex counts as river.
pub const RIVER_EPSILON: f32 = 0.01;

/// River channel parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiverParams {
    /// Number of independent channels (0 disables carving)
    pub count: u32,
    /// Half-width of a channel in grid units; depth reaches 0 at this distance
    pub width: f32,
    /// Depth carved on the center line
    pub depth: f32,
    /// Frequency of the meander noise along z
    pub curve_frequency: f32,
}

impl Default for RiverParams {
    fn default() -> Self {
        Self {
            count: 1,
            width: 4.0,
            depth: 1.5,
            curve_frequency: 0.05,
        }
    }
}

impl RiverParams {
    pub fn validate(&self) -> Result<()> {
        if self.count == 0 {
            return Ok(());
        }
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(Error::invalid(format!(
                "river width must be positive, got {}",
                self.width
            )));
        }
        if !(self.depth.is_finite() && self.depth >= 0.0) {
            return Err(Error::invalid(format!(
                "river depth must be non-negative, got {}",
                self.depth
            )));
        }
        if !self.curve_frequency.is_finite() {
            return Err(Error::invalid("river curve frequency must be finite"));
        }
        Ok(())
    }
}

/// Computes per-cell carve depth for all channels.
#[derive(Clone, Debug)]
pub struct RiverCarver {
    params: RiverParams,
    noise: UnitNoise,
    extent: f32,
}

impl RiverCarver {
    /// `extent` is the grid width the center lines span.
    pub fn new(params: RiverParams, seed: u32, extent: f32) -> Self {
        Self {
            params,
            noise: UnitNoise::new(seed),
            extent,
        }
    }

    /// X coordinate of channel `channel`'s center line at depth `z`.
    pub fn center_line(&self, channel: u32, z: f32) -> f32 {
        let i = channel as f32;
        let n = self.noise.sample((z + i * 100.0) * self.params.curve_frequency, i * 10.0);
        n * self.extent
    }

    /// Depth carved by a single channel at `(x, z)`.
    pub fn channel_depth(&self, channel: u32, x: f32, z: f32) -> f32 {
        let distance = (x - self.center_line(channel, z)).abs();
        let t = inverse_lerp(self.params.width, 0.0, distance);
        smoothstep(0.0, self.params.depth, t)
    }

    /// Total carve depth at `(x, z)`; 0 when there are no channels.
    pub fn offset(&self, x: f32, z: f32) -> f32 {
        (0..self.params.count)
            .map(|channel| self.channel_depth(channel, x, z))
            .sum()
    }
}

/// Whether a carve offset marks its vertex as river.
#[inline]
pub fn is_river(offset: f32) -> bool {
    offset > RIVER_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;

    fn carver(count: u32) -> RiverCarver {
        RiverCarver::new(
            RiverParams {
                count,
                width: 5.0,
                depth: 2.0,
                curve_frequency: 0.05,
            },
            0,
            100.0,
        )
    }

    #[test]
    fn test_no_channels_no_offset() {
        let c = carver(0);
        for (x, z) in [(0.0, 0.0), (50.0, 12.0), (99.0, 99.0)] {
            assert_eq!(c.offset(x, z), 0.0);
        }
    }

    #[test]
    fn test_full_depth_on_center_line() {
        let c = carver(1);
        for z in [0.0, 17.0, 42.5, 80.0] {
            let center = c.center_line(0, z);
            assert_eq!(c.offset(center, z), 2.0);
        }
    }

    #[test]
    fn test_zero_beyond_width() {
        let c = carver(1);
        let z = 33.0;
        let center = c.center_line(0, z);
        assert_eq!(c.channel_depth(0, center + 5.25, z), 0.0);
        assert_eq!(c.channel_depth(0, center - 7.5, z), 0.0);
        assert_eq!(c.channel_depth(0, center + 40.0, z), 0.0);
    }

    #[test]
    fn test_monotonic_in_distance() {
        let c = carver(1);
        let z = 21.0;
        let center = c.center_line(0, z);
        let mut prev = f32::INFINITY;
        for step in 0..=50 {
            let d = step as f32 * 0.1;
            let depth = c.channel_depth(0, center + d, z);
            assert!(depth <= prev, "depth increased at distance {}", d);
            prev = depth;
        }
    }

    #[test]
    fn test_channels_sum() {
        let c = carver(3);
        let (x, z) = (40.0, 60.0);
        let expected: f32 = (0..3).map(|i| c.channel_depth(i, x, z)).sum();
        assert_eq!(c.offset(x, z), expected);
    }

    #[test]
    fn test_channels_decorrelated() {
        let c = carver(2);
        let differs = (0..20).any(|z| {
            let z = z as f32 * 5.0;
            (c.center_line(0, z) - c.center_line(1, z)).abs() > 1e-3
        });
        assert!(differs);
    }

    #[test]
    fn test_center_line_within_extent() {
        let c = carver(4);
        for channel in 0..4 {
            for z in 0..100 {
                let x = c.center_line(channel, z as f32);
                assert!((0.0..=100.0).contains(&x));
            }
        }
    }

    #[test]
    fn test_is_river_threshold() {
        assert!(!is_river(0.0));
        assert!(!is_river(RIVER_EPSILON));
        assert!(is_river(0.02));
    }

    #[test]
    fn test_validate() {
        assert!(RiverParams::default().validate().is_ok());
        assert!(RiverParams { count: 0, width: 0.0, ..Default::default() }.validate().is_ok());
        assert!(RiverParams { width: 0.0, ..Default::default() }.validate().is_err());
        assert!(RiverParams { depth: -1.0, ..Default::default() }.validate().is_err());
    }
}
