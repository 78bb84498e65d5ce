// Ground-control-station server for the simulated rover.

use std::env;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch, Mutex, RwLock};
use tokio::time::Instant;
use tracing::{info, warn};

use gcs_core::config::SimConfig;

use rover_gcs_server::app::{AppState, GcsStore};
use rover_gcs_server::http;
use rover_gcs_server::model::ControlState;
use rover_gcs_server::sim::{resolve_data_dir, start_sim_task};
use rover_gcs_server::tasks;
use rover_gcs_server::utils::monotonic_ms;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let bind = env::var("HTTP_BIND").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("HTTP_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8686);
    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .expect("invalid HTTP_BIND or HTTP_PORT");

    let mut sim_config = SimConfig::default();
    if let Some(tick_ms) = env::var("SIM_TICK_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
    {
        sim_config.tick_interval = Duration::from_millis(tick_ms);
    }
    if let Some(seed) = env::var("SIM_SEED")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
    {
        sim_config.seed = Some(seed);
    }
    sim_config
        .validate()
        .expect("invalid simulation configuration");

    let data_dir = resolve_data_dir();
    let store = Arc::new(RwLock::new(GcsStore::new()));

    let (tx, _) = broadcast::channel::<String>(256);
    let (control_tx, control_rx) = watch::channel(ControlState::default());
    let sequence = Arc::new(AtomicU64::new(0));
    let sim_active = Arc::new(AtomicBool::new(false));
    let sim_state = Arc::new(Mutex::new(Default::default()));
    let start_instant = Instant::now();

    {
        let mut store = store.write().await;
        store.log.append(monotonic_ms(start_instant), "GCS Started");
    }

    let state_store = store.clone();
    let state_control_rx = control_rx.clone();
    let state_sim_active = sim_active.clone();
    let state_tx = tx.clone();
    let state_seq = sequence.clone();
    let state_start = start_instant;
    tokio::spawn(async move {
        tasks::state_update_task(
            state_store,
            state_control_rx,
            state_sim_active,
            state_tx,
            state_seq,
            state_start,
        )
        .await;
    });

    let samples_store = store.clone();
    let samples_tx = tx.clone();
    let samples_seq = sequence.clone();
    let samples_start = start_instant;
    tokio::spawn(async move {
        tasks::samples_window_task(samples_store, samples_tx, samples_seq, samples_start).await;
    });

    let log_store = store.clone();
    let log_tx = tx.clone();
    let log_seq = sequence.clone();
    let log_start = start_instant;
    tokio::spawn(async move {
        tasks::log_stream_task(log_store, log_tx, log_seq, log_start).await;
    });

    let app_state = AppState {
        tx,
        sequence,
        start_instant,
        control_tx,
        store,
        sim_config,
        sim_active,
        sim_state,
        data_dir,
    };

    let autostart = env::var("SIM_AUTOSTART")
        .map(|value| value != "0")
        .unwrap_or(true);
    if autostart {
        if let Err(err) = start_sim_task(&app_state).await {
            warn!(%err, "failed to autostart simulation");
        }
    }

    let app = http::router(app_state);

    info!(%addr, "starting server");
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .expect("server failed");
}
