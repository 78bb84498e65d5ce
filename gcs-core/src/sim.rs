// Bounded random-walk state advancement.
// Invariants: speed and battery are clamped on every step, distance never
// decreases, and a seeded generator replays an identical sequence.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{SimConfig, METERS_PER_DEGREE};
use crate::model::{GeoPoint, TelemetrySnapshot};

/// Vehicle state vector plus the noise generator that perturbs it.
pub struct Simulator {
    battery_pct: f64,
    speed_mps: f64,
    distance_m: f64,
    position: GeoPoint,
    last_timestamp_ms: Option<u64>,
    rng: StdRng,
}

impl Simulator {
    pub fn new(config: &SimConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            battery_pct: config.initial_battery_pct,
            speed_mps: 0.0,
            distance_m: 0.0,
            position: config.initial_position,
            last_timestamp_ms: None,
            rng,
        }
    }

    /// Re-homes the state vector. The generator and the timestamp floor
    /// are kept so time never runs backwards across a reset.
    pub fn reset(&mut self, config: &SimConfig) {
        self.battery_pct = config.initial_battery_pct;
        self.speed_mps = 0.0;
        self.distance_m = 0.0;
        self.position = config.initial_position;
    }

    /// Advances the walk by one tick and returns the resulting snapshot.
    ///
    /// `control_fraction` is the commanded throttle in [0, 1]; `now_ms` is
    /// the driver's clock, bumped past the previous timestamp if needed.
    pub fn advance(
        &mut self,
        config: &SimConfig,
        control_fraction: f64,
        now_ms: u64,
    ) -> TelemetrySnapshot {
        let dt = config.tick_seconds();

        let speed = (self.speed_mps + control_fraction * config.max_speed_mps)
            .clamp(0.0, config.max_speed_mps);
        let distance = self.distance_m + speed * dt;
        let battery = (self.battery_pct
            - speed * config.drain_coefficient
            - config.idle_drain_pct)
            .clamp(0.0, 100.0);

        let step_deg = speed * dt / METERS_PER_DEGREE;
        let position = GeoPoint::new(
            self.position.lat_deg + step_deg + self.noise(config.position_jitter_deg),
            self.position.lon_deg + step_deg + self.noise(config.position_jitter_deg),
        );
        let temperature_c =
            config.baseline_temperature_c + self.noise(config.temperature_noise_c);

        let timestamp_ms = match self.last_timestamp_ms {
            Some(last) => now_ms.max(last + 1),
            None => now_ms,
        };
        self.last_timestamp_ms = Some(timestamp_ms);

        self.speed_mps = speed;
        self.distance_m = distance;
        self.battery_pct = battery;
        self.position = position;

        TelemetrySnapshot {
            timestamp_ms,
            battery_pct: battery,
            speed_mps: speed,
            distance_m: distance,
            position,
            temperature_c,
        }
    }

    /// Uniform sample in [-amplitude, amplitude). A zero amplitude skips
    /// the draw entirely.
    fn noise(&mut self, amplitude: f64) -> f64 {
        if amplitude == 0.0 {
            return 0.0;
        }
        self.rng.gen_range(-amplitude..amplitude)
    }

    pub(crate) fn timestamp_floor(&self) -> Option<u64> {
        self.last_timestamp_ms
    }

    pub(crate) fn set_timestamp_floor(&mut self, floor: Option<u64>) {
        self.last_timestamp_ms = floor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_config() -> SimConfig {
        SimConfig {
            position_jitter_deg: 0.0,
            temperature_noise_c: 0.0,
            seed: Some(1),
            ..SimConfig::default()
        }
    }

    #[test]
    fn stationary_vehicle_only_pays_idle_drain() {
        let config = quiet_config();
        let mut sim = Simulator::new(&config);
        let snapshot = sim.advance(&config, 0.0, 1_000);
        assert_eq!(snapshot.speed_mps, 0.0);
        assert_eq!(snapshot.distance_m, 0.0);
        assert!((snapshot.battery_pct - 99.95).abs() < 1e-9);
        assert_eq!(snapshot.position, config.initial_position);
    }

    #[test]
    fn timestamp_bumps_past_a_stalled_clock() {
        let config = quiet_config();
        let mut sim = Simulator::new(&config);
        let first = sim.advance(&config, 0.0, 500);
        let second = sim.advance(&config, 0.0, 500);
        let third = sim.advance(&config, 0.0, 400);
        assert_eq!(first.timestamp_ms, 500);
        assert_eq!(second.timestamp_ms, 501);
        assert_eq!(third.timestamp_ms, 502);
    }

    #[test]
    fn reset_keeps_the_timestamp_floor() {
        let config = quiet_config();
        let mut sim = Simulator::new(&config);
        sim.advance(&config, 1.0, 9_000);
        sim.reset(&config);
        let snapshot = sim.advance(&config, 0.0, 100);
        assert_eq!(snapshot.timestamp_ms, 9_001);
        assert_eq!(snapshot.distance_m, 0.0);
    }
}
