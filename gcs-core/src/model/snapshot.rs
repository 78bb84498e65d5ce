// Immutable telemetry snapshot emitted once per simulation tick.
// Invariants: battery and speed arrive pre-clamped, distance never
// decreases, and timestamps are strictly increasing within one source.

use serde::{Deserialize, Serialize};

/// WGS84 coordinate in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat_deg: f64,
    pub lon_deg: f64,
}

impl GeoPoint {
    pub fn new(lat_deg: f64, lon_deg: f64) -> Self {
        Self { lat_deg, lon_deg }
    }
}

/// One complete reading of the simulated vehicle state. Consumers receive
/// snapshots by reference during dispatch and copy what they keep.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    /// Milliseconds on the driver's clock, deduplicated to stay strictly
    /// increasing even when the clock stalls.
    pub timestamp_ms: u64,
    /// Remaining charge, clamped to [0, 100].
    pub battery_pct: f64,
    /// Ground speed in meters per second, clamped to [0, max_speed_mps].
    pub speed_mps: f64,
    /// Cumulative odometer in meters.
    pub distance_m: f64,
    pub position: GeoPoint,
    /// Ambient reading around the configured baseline. Unbounded.
    pub temperature_c: f64,
}
