// HTTP handlers and routing.

use axum::extract::State as AxumState;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tracing::warn;

use crate::app::AppState;
use crate::constants::{LOG_FILE, WINDOW_DURATION_MS};
use crate::model::{ControlState, Waypoint, PAN_RANGE, SERVO_RANGE, TILT_RANGE};
use crate::sim;
use crate::utils::monotonic_ms;
use crate::ws::ws_handler;

mod types;
use types::*;

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/sim/status", get(get_sim_status))
        .route("/sim/start", axum::routing::post(start_sim))
        .route("/sim/stop", axum::routing::post(stop_sim))
        .route("/sim/reset", axum::routing::post(reset_sim))
        .route("/control", get(get_control))
        .route("/control/drive", axum::routing::post(set_drive))
        .route("/control/speed", axum::routing::post(set_speed))
        .route("/control/servo", axum::routing::post(set_servo))
        .route("/control/pan", axum::routing::post(set_pan))
        .route("/control/tilt", axum::routing::post(set_tilt))
        .route("/control/lock", axum::routing::post(set_lock))
        .route("/control/shoot", axum::routing::post(activate_shoot))
        .route(
            "/mission/waypoints",
            get(list_waypoints)
                .post(add_waypoint)
                .delete(clear_waypoints),
        )
        .route(
            "/mission/waypoints/:index",
            axum::routing::delete(remove_waypoint),
        )
        .route("/mission/upload", axum::routing::post(upload_mission))
        .route("/mission/start", axum::routing::post(mission_start))
        .route("/mission/pause", axum::routing::post(mission_pause))
        .route("/mission/resume", axum::routing::post(mission_resume))
        .route("/mission/abort", axum::routing::post(mission_abort))
        .route("/log", get(get_log))
        .route("/log/save", axum::routing::post(save_log))
        .route("/log/clear", axum::routing::post(clear_log))
        .route("/map/path", get(get_map_path))
        .route("/telemetry/latest", get(get_telemetry_latest))
        .route("/telemetry/samples", get(get_telemetry_samples))
        .route("/ws", get(ws_handler))
        .with_state(app_state)
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

async fn sim_status(app_state: &AppState) -> SimStatusResponse {
    let active = app_state.sim_state.lock().await.active;
    SimStatusResponse {
        active,
        tick_ms: app_state.sim_config.tick_interval.as_millis() as u64,
        seed: app_state.sim_config.seed,
    }
}

async fn get_sim_status(AxumState(app_state): AxumState<AppState>) -> impl IntoResponse {
    Json(sim_status(&app_state).await)
}

async fn start_sim(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<SimStatusResponse>, (StatusCode, Json<serde_json::Value>)> {
    if let Err(err) = sim::start_sim_task(&app_state).await {
        warn!(%err, "failed to start simulation");
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": err.to_string() })),
        ));
    }
    Ok(Json(sim_status(&app_state).await))
}

async fn stop_sim(AxumState(app_state): AxumState<AppState>) -> impl IntoResponse {
    sim::stop_sim_task(&app_state).await;
    Json(sim_status(&app_state).await)
}

async fn reset_sim(AxumState(app_state): AxumState<AppState>) -> impl IntoResponse {
    sim::reset_sim(&app_state).await;
    Json(sim_status(&app_state).await)
}

/// Appends a `CMD ->` acknowledgement to the mission log.
async fn log_command(app_state: &AppState, command: &str) {
    let t_ms = monotonic_ms(app_state.start_instant);
    let mut store = app_state.store.write().await;
    store.log.append(t_ms, format!("CMD -> {command}"));
}

async fn get_control(AxumState(app_state): AxumState<AppState>) -> impl IntoResponse {
    let control = *app_state.control_tx.borrow();
    Json(control)
}

async fn set_drive(
    AxumState(app_state): AxumState<AppState>,
    Json(payload): Json<DriveRequest>,
) -> impl IntoResponse {
    let mut control = *app_state.control_tx.borrow();
    control.drive = payload.command;
    let _ = app_state.control_tx.send(control);
    log_command(&app_state, payload.command.log_label()).await;
    Json(control)
}

async fn set_speed(
    AxumState(app_state): AxumState<AppState>,
    Json(payload): Json<SpeedRequest>,
) -> impl IntoResponse {
    let mut control = *app_state.control_tx.borrow();
    control.speed_lever = payload.value;
    let _ = app_state.control_tx.send(control);
    log_command(&app_state, &format!("SPEED:{}", payload.value)).await;
    Json(control)
}

fn angle_error(
    label: &str,
    range: &std::ops::RangeInclusive<i16>,
) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({
            "error": format!("{label} angle out of range"),
            "min": *range.start(),
            "max": *range.end(),
        })),
    )
}

async fn set_servo(
    AxumState(app_state): AxumState<AppState>,
    Json(payload): Json<AngleRequest>,
) -> Result<Json<ControlState>, (StatusCode, Json<serde_json::Value>)> {
    if !SERVO_RANGE.contains(&payload.angle) {
        return Err(angle_error("servo", &SERVO_RANGE));
    }
    let mut control = *app_state.control_tx.borrow();
    control.servo_deg = payload.angle;
    let _ = app_state.control_tx.send(control);
    log_command(&app_state, &format!("SERVO:{}", payload.angle)).await;
    Ok(Json(control))
}

async fn set_pan(
    AxumState(app_state): AxumState<AppState>,
    Json(payload): Json<AngleRequest>,
) -> Result<Json<ControlState>, (StatusCode, Json<serde_json::Value>)> {
    if !PAN_RANGE.contains(&payload.angle) {
        return Err(angle_error("pan", &PAN_RANGE));
    }
    let mut control = *app_state.control_tx.borrow();
    control.pan_deg = payload.angle;
    let _ = app_state.control_tx.send(control);
    log_command(&app_state, &format!("PAN:{}", payload.angle)).await;
    Ok(Json(control))
}

async fn set_tilt(
    AxumState(app_state): AxumState<AppState>,
    Json(payload): Json<AngleRequest>,
) -> Result<Json<ControlState>, (StatusCode, Json<serde_json::Value>)> {
    if !TILT_RANGE.contains(&payload.angle) {
        return Err(angle_error("tilt", &TILT_RANGE));
    }
    let mut control = *app_state.control_tx.borrow();
    control.tilt_deg = payload.angle;
    let _ = app_state.control_tx.send(control);
    log_command(&app_state, &format!("TILT:{}", payload.angle)).await;
    Ok(Json(control))
}

async fn set_lock(
    AxumState(app_state): AxumState<AppState>,
    Json(payload): Json<LockRequest>,
) -> impl IntoResponse {
    let mut control = *app_state.control_tx.borrow();
    control.locked = payload.locked;
    let _ = app_state.control_tx.send(control);

    let t_ms = monotonic_ms(app_state.start_instant);
    let mut store = app_state.store.write().await;
    store.path.set_locked(payload.locked);
    let line = if payload.locked {
        "Target Locked"
    } else {
        "Target Unlocked"
    };
    store.log.append(t_ms, line);
    drop(store);

    Json(control)
}

async fn activate_shoot(AxumState(app_state): AxumState<AppState>) -> impl IntoResponse {
    let t_ms = monotonic_ms(app_state.start_instant);
    let mut store = app_state.store.write().await;
    store.log.append(t_ms, ">>> SHOOT ACTIVATED <<<");
    store.log.append(t_ms, "Projectile fired at target coordinates");
    drop(store);
    Json(json!({ "fired": true }))
}

fn waypoint_list(waypoints: &[Waypoint], uploaded: bool) -> WaypointListResponse {
    WaypointListResponse {
        waypoints: waypoints.to_vec(),
        uploaded,
    }
}

async fn list_waypoints(AxumState(app_state): AxumState<AppState>) -> impl IntoResponse {
    let store = app_state.store.read().await;
    Json(waypoint_list(
        store.mission.waypoints(),
        store.mission.uploaded(),
    ))
}

async fn add_waypoint(
    AxumState(app_state): AxumState<AppState>,
    Json(payload): Json<WaypointRequest>,
) -> Result<Json<WaypointListResponse>, (StatusCode, Json<serde_json::Value>)> {
    if !(-90.0..=90.0).contains(&payload.lat_deg) || !(-180.0..=180.0).contains(&payload.lon_deg)
    {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": "waypoint coordinates out of range" })),
        ));
    }
    let waypoint = Waypoint {
        lat_deg: payload.lat_deg,
        lon_deg: payload.lon_deg,
        alt_m: payload.alt_m,
    };

    let t_ms = monotonic_ms(app_state.start_instant);
    let mut store = app_state.store.write().await;
    store.mission.add(waypoint);
    store
        .log
        .append(t_ms, format!("[ADD] {}", waypoint.log_label()));
    Ok(Json(waypoint_list(
        store.mission.waypoints(),
        store.mission.uploaded(),
    )))
}

async fn remove_waypoint(
    AxumState(app_state): AxumState<AppState>,
    axum::extract::Path(index): axum::extract::Path<usize>,
) -> Result<Json<WaypointListResponse>, (StatusCode, Json<serde_json::Value>)> {
    let t_ms = monotonic_ms(app_state.start_instant);
    let mut store = app_state.store.write().await;
    match store.mission.remove(index) {
        Some(waypoint) => {
            store
                .log
                .append(t_ms, format!("[REMOVE] {}", waypoint.log_label()));
            Ok(Json(waypoint_list(
                store.mission.waypoints(),
                store.mission.uploaded(),
            )))
        }
        None => Err((
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "waypoint index out of range",
                "index": index,
            })),
        )),
    }
}

async fn clear_waypoints(AxumState(app_state): AxumState<AppState>) -> impl IntoResponse {
    let t_ms = monotonic_ms(app_state.start_instant);
    let mut store = app_state.store.write().await;
    let removed = store.mission.clear();
    store.log.append(t_ms, "[CLEAR] All waypoints removed");
    Json(json!({ "removed": removed }))
}

async fn upload_mission(AxumState(app_state): AxumState<AppState>) -> impl IntoResponse {
    let t_ms = monotonic_ms(app_state.start_instant);
    let mut store = app_state.store.write().await;
    if store.mission.upload() {
        let count = store.mission.len();
        let labels: Vec<String> = store
            .mission
            .waypoints()
            .iter()
            .map(|waypoint| format!("    {}", waypoint.log_label()))
            .collect();
        store
            .log
            .append(t_ms, "[UPLOAD] Mission uploaded with waypoints:");
        for label in labels {
            store.log.append(t_ms, label);
        }
        Json(MissionUploadResponse {
            uploaded: true,
            count,
        })
    } else {
        store.log.append(t_ms, "[UPLOAD] No waypoints to upload!");
        Json(MissionUploadResponse {
            uploaded: false,
            count: 0,
        })
    }
}

async fn mission_event(app_state: &AppState, label: &'static str) -> Json<serde_json::Value> {
    let t_ms = monotonic_ms(app_state.start_instant);
    let mut store = app_state.store.write().await;
    store.log.append(t_ms, format!("[MISSION] {label}"));
    Json(json!({ "status": label.to_lowercase() }))
}

async fn mission_start(AxumState(app_state): AxumState<AppState>) -> impl IntoResponse {
    mission_event(&app_state, "Started").await
}

async fn mission_pause(AxumState(app_state): AxumState<AppState>) -> impl IntoResponse {
    mission_event(&app_state, "Paused").await
}

async fn mission_resume(AxumState(app_state): AxumState<AppState>) -> impl IntoResponse {
    mission_event(&app_state, "Resumed").await
}

async fn mission_abort(AxumState(app_state): AxumState<AppState>) -> impl IntoResponse {
    mission_event(&app_state, "Aborted").await
}

async fn get_log(
    AxumState(app_state): AxumState<AppState>,
    axum::extract::Query(query): axum::extract::Query<LogQuery>,
) -> impl IntoResponse {
    let store = app_state.store.read().await;
    Json(LogResponse {
        entries: store.log.tail(query.limit.unwrap_or(200)),
        last_seq: store.log.last_seq(),
    })
}

async fn save_log(
    AxumState(app_state): AxumState<AppState>,
    payload: Option<Json<SaveLogRequest>>,
) -> Result<Json<LogSaveResponse>, (StatusCode, Json<serde_json::Value>)> {
    let file = payload
        .and_then(|Json(request)| request.file)
        .unwrap_or_else(|| LOG_FILE.to_string());
    if file.contains("..") || file.contains('/') || file.contains('\\') {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": "file name must not contain path separators" })),
        ));
    }
    let path = app_state.data_dir.join(&file);

    if let Err(err) = tokio::fs::create_dir_all(&app_state.data_dir).await {
        warn!(?err, "failed to create data directory");
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "failed to create data directory" })),
        ));
    }

    let (text, lines) = {
        let store = app_state.store.read().await;
        (store.log.render(), store.log.len())
    };
    if let Err(err) = tokio::fs::write(&path, text).await {
        warn!(?err, path = %path.display(), "failed to write mission log");
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "failed to write mission log" })),
        ));
    }

    let t_ms = monotonic_ms(app_state.start_instant);
    let mut store = app_state.store.write().await;
    store
        .log
        .append(t_ms, format!("Log saved to {}", path.display()));

    Ok(Json(LogSaveResponse {
        path: path.to_string_lossy().to_string(),
        lines,
    }))
}

async fn clear_log(AxumState(app_state): AxumState<AppState>) -> impl IntoResponse {
    let t_ms = monotonic_ms(app_state.start_instant);
    let mut store = app_state.store.write().await;
    store.log.clear(t_ms);
    Json(json!({ "cleared": true }))
}

async fn get_map_path(AxumState(app_state): AxumState<AppState>) -> impl IntoResponse {
    let store = app_state.store.read().await;
    Json(MapPathResponse {
        points: store.path.points().to_vec(),
        marker: store.path.marker(),
        locked: store.path.locked(),
    })
}

async fn get_telemetry_latest(AxumState(app_state): AxumState<AppState>) -> impl IntoResponse {
    let store = app_state.store.read().await;
    Json(TelemetryLatestResponse {
        snapshot: store.latest,
        sim_active: app_state
            .sim_active
            .load(std::sync::atomic::Ordering::Relaxed),
    })
}

async fn get_telemetry_samples(
    AxumState(app_state): AxumState<AppState>,
    axum::extract::Query(query): axum::extract::Query<SamplesQuery>,
) -> impl IntoResponse {
    let duration_ms = query.duration_ms.unwrap_or(WINDOW_DURATION_MS);
    let end_ms = monotonic_ms(app_state.start_instant);
    let start_ms = end_ms.saturating_sub(duration_ms);
    let samples = {
        let store = app_state.store.read().await;
        store
            .samples
            .to_vec_ordered()
            .into_iter()
            .filter(|sample| sample.t_ms >= start_ms)
            .collect()
    };
    Json(SamplesResponse {
        start_ms,
        end_ms,
        samples,
    })
}
