// Simulation parameters with validation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::GeoPoint;

/// Meters of ground travel per degree of latitude or longitude. Good
/// enough for the small drift distances the simulator covers.
pub const METERS_PER_DEGREE: f64 = 111_000.0;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(1_500);

/// Parade-ground start position north of Delhi.
pub const DEFAULT_HOME: GeoPoint = GeoPoint {
    lat_deg: 28.6,
    lon_deg: 77.2,
};

/// Tunable parameters for one telemetry source. `Default` yields the
/// stock rover profile; `validate` gates every path that accepts a config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub tick_interval: Duration,
    pub initial_position: GeoPoint,
    pub initial_battery_pct: f64,
    /// Control fraction applied when no operator input is set, in [0, 1].
    pub speed_bias: f64,
    pub max_speed_mps: f64,
    /// Battery percent consumed per meter-per-second of speed per tick.
    pub drain_coefficient: f64,
    /// Battery percent consumed per tick regardless of motion.
    pub idle_drain_pct: f64,
    pub baseline_temperature_c: f64,
    /// Half-width of the uniform positional jitter, in degrees.
    pub position_jitter_deg: f64,
    /// Half-width of the uniform temperature noise, in Celsius.
    pub temperature_noise_c: f64,
    /// Fixed RNG seed. Two sources with the same seed and inputs produce
    /// bit-identical snapshot sequences. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            initial_position: DEFAULT_HOME,
            initial_battery_pct: 100.0,
            speed_bias: 0.0,
            max_speed_mps: 1.5,
            drain_coefficient: 0.02,
            idle_drain_pct: 0.05,
            baseline_temperature_c: 20.0,
            position_jitter_deg: 1e-6,
            temperature_noise_c: 1.5,
            seed: None,
        }
    }
}

impl SimConfig {
    /// Checks every parameter and reports the first violation. NaN fails
    /// the range checks.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval.is_zero() {
            return Err(ConfigError::NonPositiveTickInterval);
        }
        if !(0.0..=100.0).contains(&self.initial_battery_pct) {
            return Err(ConfigError::BatteryOutOfRange {
                value: self.initial_battery_pct,
            });
        }
        if !(0.0..=1.0).contains(&self.speed_bias) {
            return Err(ConfigError::SpeedBiasOutOfRange {
                value: self.speed_bias,
            });
        }
        if self.max_speed_mps.is_nan() || self.max_speed_mps <= 0.0 {
            return Err(ConfigError::NonPositiveMaxSpeed {
                value: self.max_speed_mps,
            });
        }
        for (field, value) in [
            ("drain_coefficient", self.drain_coefficient),
            ("idle_drain_pct", self.idle_drain_pct),
            ("position_jitter_deg", self.position_jitter_deg),
            ("temperature_noise_c", self.temperature_noise_c),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(ConfigError::NegativeParameter { field, value });
            }
        }
        Ok(())
    }

    pub fn tick_seconds(&self) -> f64 {
        self.tick_interval.as_secs_f64()
    }
}
