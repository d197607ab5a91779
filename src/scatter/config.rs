//! Object scatter configuration.

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};

/// Configuration for the object scatter pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterConfig {
    /// Minimum biome blend weight a sample needs to spawn anything
    pub blend_threshold: f32,
    /// Minimum vertex height a sample needs to spawn anything
    pub min_height: f32,
    /// Spawn on every eligible sample regardless of density
    pub ignore_spawn_chance: bool,
    /// Grid distance between scatter samples
    pub check_interval: f32,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            blend_threshold: 0.3,
            min_height: 0.1,
            ignore_spawn_chance: false,
            check_interval: 2.0,
        }
    }
}

impl ScatterConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.check_interval.is_finite() && self.check_interval > 0.0) {
            return Err(Error::invalid(format!(
                "spawn check interval must be positive, got {}",
                self.check_interval
            )));
        }
        if !(0.0..=1.0).contains(&self.blend_threshold) {
            return Err(Error::invalid(format!(
                "spawn blend threshold {} outside [0, 1]",
                self.blend_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.min_height) {
            return Err(Error::invalid(format!(
                "spawn min height {} outside [0, 1]",
                self.min_height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = ScatterConfig::default();
        assert!(!cfg.ignore_spawn_chance);
        assert!(cfg.check_interval > 0.0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_interval() {
        for interval in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let cfg = ScatterConfig { check_interval: interval, ..Default::default() };
            assert!(cfg.validate().is_err(), "interval {} accepted", interval);
        }
    }

    #[test]
    fn test_rejects_out_of_range_thresholds() {
        let cfg = ScatterConfig { blend_threshold: 1.5, ..Default::default() };
        assert!(cfg.validate().is_err());
        let cfg = ScatterConfig { min_height: -0.1, ..Default::default() };
        assert!(cfg.validate().is_err());
    }
}
