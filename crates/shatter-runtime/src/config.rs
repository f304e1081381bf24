//! Runtime configuration.

use serde::{Deserialize, Serialize};
use shatter_core::FractureParams;

/// Recognized shattering options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShatterConfig {
    /// Site-grid extent fraction in `[0, 1]`; controls fragment granularity.
    pub size: f64,

    /// Minimum impact speed for collision-driven fractures.
    pub trigger_speed_threshold: f64,

    /// `(min, max)` seconds before the non-trigger pieces cascade loose.
    pub cascade_delay: (f64, f64),
}

impl Default for ShatterConfig {
    fn default() -> Self {
        Self {
            size: 0.2,
            trigger_speed_threshold: 1.0,
            cascade_delay: (0.5, 1.0),
        }
    }
}

impl ShatterConfig {
    /// Clamp and reorder fields into their valid ranges.
    pub fn validated(mut self) -> Self {
        self.size = self.size.clamp(0.0, 1.0);
        self.trigger_speed_threshold = self.trigger_speed_threshold.max(0.0);

        let (min, max) = self.cascade_delay;
        let min = min.max(0.0);
        let max = max.max(min);
        self.cascade_delay = (min, max);
        self
    }

    /// Fracture parameters for this configuration.
    pub fn fracture_params(&self, seed: Option<u64>) -> FractureParams {
        FractureParams {
            size: self.size,
            seed,
            ..Default::default()
        }
    }
}
