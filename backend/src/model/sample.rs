// Downsampled telemetry sample used in the analysis chart window.

use gcs_core::model::TelemetrySnapshot;
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub struct TelemetrySample {
    pub t_ms: u64,
    pub battery_pct: f64,
    pub speed_mps: f64,
    pub temperature_c: f64,
}

impl TelemetrySample {
    pub fn from_snapshot(snapshot: &TelemetrySnapshot) -> Self {
        Self {
            t_ms: snapshot.timestamp_ms,
            battery_pct: snapshot.battery_pct,
            speed_mps: snapshot.speed_mps,
            temperature_c: snapshot.temperature_c,
        }
    }
}
