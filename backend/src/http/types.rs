// HTTP request and response payload types.

use serde::{Deserialize, Serialize};

use gcs_core::log::LogEntry;
use gcs_core::model::{GeoPoint, TelemetrySnapshot};

use crate::model::{DriveCommand, TelemetrySample, Waypoint};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct SimStatusResponse {
    pub active: bool,
    pub tick_ms: u64,
    pub seed: Option<u64>,
}

#[derive(Serialize)]
pub struct TelemetryLatestResponse {
    pub snapshot: Option<TelemetrySnapshot>,
    pub sim_active: bool,
}

#[derive(Serialize)]
pub struct SamplesResponse {
    pub start_ms: u64,
    pub end_ms: u64,
    pub samples: Vec<TelemetrySample>,
}

#[derive(Serialize)]
pub struct MapPathResponse {
    pub points: Vec<GeoPoint>,
    pub marker: Option<GeoPoint>,
    pub locked: bool,
}

#[derive(Serialize)]
pub struct WaypointListResponse {
    pub waypoints: Vec<Waypoint>,
    pub uploaded: bool,
}

#[derive(Serialize)]
pub struct MissionUploadResponse {
    pub uploaded: bool,
    pub count: usize,
}

#[derive(Serialize)]
pub struct LogResponse {
    pub entries: Vec<LogEntry>,
    pub last_seq: u64,
}

#[derive(Serialize)]
pub struct LogSaveResponse {
    pub path: String,
    pub lines: usize,
}

#[derive(Deserialize)]
pub struct DriveRequest {
    pub command: DriveCommand,
}

#[derive(Deserialize)]
pub struct SpeedRequest {
    pub value: u8,
}

#[derive(Deserialize)]
pub struct AngleRequest {
    pub angle: i16,
}

#[derive(Deserialize)]
pub struct LockRequest {
    pub locked: bool,
}

#[derive(Deserialize)]
pub struct WaypointRequest {
    pub lat_deg: f64,
    pub lon_deg: f64,
    #[serde(default)]
    pub alt_m: f64,
}

#[derive(Deserialize)]
pub struct SaveLogRequest {
    /// File name under the data directory. Defaults to the stock name.
    pub file: Option<String>,
}

#[derive(Deserialize)]
pub struct SamplesQuery {
    pub duration_ms: Option<u64>,
}

#[derive(Deserialize)]
pub struct LogQuery {
    pub limit: Option<usize>,
}
