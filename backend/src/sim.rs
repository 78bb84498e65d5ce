// Simulation task lifecycle and data path resolution.

use std::env;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch, RwLock};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{info, warn};

use gcs_core::config::SimConfig;
use gcs_core::error::ConfigError;
use gcs_core::model::TelemetrySnapshot;
use gcs_core::source::TelemetrySource;

use crate::app::{AppState, GcsStore, SimCommand};
use crate::model::ControlState;
use crate::telemetry::{apply_snapshot, QueueSink};
use crate::utils::monotonic_ms;

pub fn resolve_data_dir() -> PathBuf {
    if let Ok(value) = env::var("ROVER_GCS_DATA_DIR") {
        return PathBuf::from(value);
    }
    let local = PathBuf::from("./data");
    if local.is_dir() {
        return local;
    }
    let parent = PathBuf::from("../data");
    if parent.is_dir() {
        return parent;
    }
    local
}

/// Drops the telemetry views that a vehicle reset invalidates. The
/// traveled path and the mission log deliberately survive, the path so
/// the map keeps the pre-reset track, the log because it narrates it.
pub async fn reset_store_for_sim(store: &Arc<RwLock<GcsStore>>) {
    let mut store = store.write().await;
    store.latest = None;
    store.samples.clear();
}

/// Builds a stopped source with the server's snapshot queue attached.
pub fn build_sim_source(
    config: SimConfig,
    snapshot_tx: mpsc::UnboundedSender<TelemetrySnapshot>,
) -> Result<TelemetrySource, ConfigError> {
    let mut source = TelemetrySource::new(config)?;
    if let Err(err) = source.subscribe(Box::new(QueueSink::new(snapshot_tx))) {
        warn!(%err, "snapshot queue subscription rejected");
    }
    Ok(source)
}

/// Drains queued snapshots into the store. Ends when the producing sink
/// is dropped with its source.
pub async fn snapshot_apply_loop(
    mut snapshot_rx: mpsc::UnboundedReceiver<TelemetrySnapshot>,
    store: Arc<RwLock<GcsStore>>,
) {
    while let Some(snapshot) = snapshot_rx.recv().await {
        apply_snapshot(&store, snapshot).await;
    }
}

/// Drives the source at its configured cadence until cancelled. The
/// in-flight tick always completes; cancellation is only observed
/// between ticks.
pub async fn sim_loop(
    mut source: TelemetrySource,
    store: Arc<RwLock<GcsStore>>,
    control_rx: watch::Receiver<ControlState>,
    mut command_rx: mpsc::Receiver<SimCommand>,
    start: Instant,
    mut cancel: oneshot::Receiver<()>,
) {
    let tick_interval = source.config().tick_interval;
    let mut interval = time::interval(tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    source.start();
    info!(
        tick_ms = tick_interval.as_millis() as u64,
        "simulation loop started"
    );

    loop {
        tokio::select! {
            _ = &mut cancel => break,
            Some(command) = command_rx.recv() => match command {
                SimCommand::Reset => {
                    source.reset();
                    reset_store_for_sim(&store).await;
                }
            },
            _ = interval.tick() => {
                source.set_control_input(control_rx.borrow().speed_fraction());
                let now_ms = monotonic_ms(start);
                source.tick(now_ms);
            }
        }
    }

    source.stop();
    info!("simulation loop stopped");
}

/// Starts the simulation task pair if it is not already running.
/// Idempotent; a second call while active does nothing.
pub async fn start_sim_task(app_state: &AppState) -> Result<(), ConfigError> {
    let mut sim_state = app_state.sim_state.lock().await;
    if sim_state.active {
        return Ok(());
    }

    let (snapshot_tx, snapshot_rx) = mpsc::unbounded_channel();
    let source = build_sim_source(app_state.sim_config.clone(), snapshot_tx)?;

    let (cancel_tx, cancel_rx) = oneshot::channel();
    let (command_tx, command_rx) = mpsc::channel(8);

    app_state.sim_active.store(true, Ordering::Relaxed);

    tokio::spawn(snapshot_apply_loop(snapshot_rx, app_state.store.clone()));

    let store = app_state.store.clone();
    let control_rx = app_state.control_tx.subscribe();
    let start = app_state.start_instant;
    let sim_state_handle = app_state.sim_state.clone();
    let sim_active = app_state.sim_active.clone();
    let handle = tokio::spawn(async move {
        sim_loop(source, store, control_rx, command_rx, start, cancel_rx).await;
        sim_active.store(false, Ordering::Relaxed);
        let mut sim_state = sim_state_handle.lock().await;
        sim_state.active = false;
        sim_state.cancel = None;
        sim_state.command_tx = None;
    });

    sim_state.active = true;
    sim_state.cancel = Some(cancel_tx);
    sim_state.command_tx = Some(command_tx);
    sim_state.handle = Some(handle);

    Ok(())
}

/// Stops the simulation task if one is running, waiting for its final
/// tick to complete before returning. Idempotent.
pub async fn stop_sim_task(app_state: &AppState) {
    let (cancel, handle) = {
        let mut sim_state = app_state.sim_state.lock().await;
        sim_state.active = false;
        sim_state.command_tx = None;
        (sim_state.cancel.take(), sim_state.handle.take())
    };
    if let Some(cancel) = cancel {
        let _ = cancel.send(());
    }
    if let Some(handle) = handle {
        if handle.await.is_err() {
            warn!("simulation task ended abnormally");
        }
    }
    app_state.sim_active.store(false, Ordering::Relaxed);
}

/// Re-homes the vehicle. Routed through the running task so the reset
/// never lands mid-tick; applied directly when the simulation is
/// stopped.
pub async fn reset_sim(app_state: &AppState) {
    let command_tx = {
        let sim_state = app_state.sim_state.lock().await;
        sim_state.command_tx.clone()
    };
    let routed = match command_tx {
        Some(command_tx) => command_tx.send(SimCommand::Reset).await.is_ok(),
        None => false,
    };
    if !routed {
        reset_store_for_sim(&app_state.store).await;
    }
    let t_ms = monotonic_ms(app_state.start_instant);
    let mut store = app_state.store.write().await;
    store.log.append(t_ms, "Rover reloaded / reset to home position");
}
