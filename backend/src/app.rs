// Application state and shared data structures for the server.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot, watch, Mutex, RwLock};
use tokio::time::Instant;

use gcs_core::config::SimConfig;
use gcs_core::log::MissionLog;
use gcs_core::model::TelemetrySnapshot;
use gcs_core::path::PathTracker;

use crate::buffers::RingBuffer;
use crate::constants::{MISSION_LOG_CAP, SAMPLE_BUFFER_CAP};
use crate::model::{ControlState, MissionPlan, TelemetrySample};

#[derive(Clone)]
pub struct AppState {
    pub tx: broadcast::Sender<String>,
    pub sequence: Arc<AtomicU64>,
    pub start_instant: Instant,
    pub control_tx: watch::Sender<ControlState>,
    pub store: Arc<RwLock<GcsStore>>,
    pub sim_config: SimConfig,
    pub sim_active: Arc<AtomicBool>,
    pub sim_state: Arc<Mutex<SimTaskState>>,
    pub data_dir: PathBuf,
}

/// Everything the ground station knows about the vehicle, behind one
/// lock. The simulation apply task is the only writer of telemetry
/// fields; HTTP handlers write the planner and log fields.
pub struct GcsStore {
    pub latest: Option<TelemetrySnapshot>,
    pub samples: RingBuffer<TelemetrySample>,
    pub path: PathTracker,
    pub log: MissionLog,
    pub mission: MissionPlan,
}

impl GcsStore {
    pub fn new() -> Self {
        Self {
            latest: None,
            samples: RingBuffer::new(SAMPLE_BUFFER_CAP),
            path: PathTracker::new(),
            log: MissionLog::new(MISSION_LOG_CAP),
            mission: MissionPlan::default(),
        }
    }
}

impl Default for GcsStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Commands delivered to a running simulation task.
#[derive(Clone, Copy, Debug)]
pub enum SimCommand {
    Reset,
}

/// Lifecycle bookkeeping for the simulation task. `cancel` ends the
/// task's select loop; `handle` lets stop wait for the in-flight tick
/// to finish before reporting the source stopped.
#[derive(Default)]
pub struct SimTaskState {
    pub active: bool,
    pub cancel: Option<oneshot::Sender<()>>,
    pub command_tx: Option<mpsc::Sender<SimCommand>>,
    pub handle: Option<tokio::task::JoinHandle<()>>,
}
