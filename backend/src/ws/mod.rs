// WebSocket transport layer for ground-station streaming.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State as AxumState;
use axum::response::IntoResponse;
use futures::StreamExt;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use gcs_core::log::LogEntry;
use gcs_core::model::TelemetrySnapshot;

use crate::app::AppState;
use crate::constants::SCHEMA_VERSION;
use crate::model::{ControlState, TelemetrySample};
use crate::utils::{monotonic_ms, next_sequence, now_epoch_ms};

#[derive(Serialize)]
pub struct HandshakeHello {
    pub schema_version: &'static str,
    pub timestamp_ms: u64,
    pub monotonic_ms: u64,
    pub sequence: u64,
    #[serde(rename = "type")]
    pub message_type: &'static str,
    pub server_version: &'static str,
    pub capabilities: Vec<&'static str>,
}

#[derive(Serialize)]
pub struct StateUpdateMessage {
    pub schema_version: &'static str,
    pub timestamp_ms: u64,
    pub monotonic_ms: u64,
    pub sequence: u64,
    #[serde(rename = "type")]
    pub message_type: &'static str,
    pub snapshot: TelemetrySnapshot,
    pub sim_active: bool,
    pub locked: bool,
    pub control: ControlState,
}

#[derive(Serialize)]
pub struct SamplesWindow {
    pub start_ms: u64,
    pub end_ms: u64,
    pub stride_ms: u64,
    pub samples: Vec<TelemetrySample>,
}

#[derive(Serialize)]
pub struct SamplesWindowMessage {
    pub schema_version: &'static str,
    pub timestamp_ms: u64,
    pub monotonic_ms: u64,
    pub sequence: u64,
    #[serde(rename = "type")]
    pub message_type: &'static str,
    pub window: SamplesWindow,
    pub decimated: bool,
}

#[derive(Serialize)]
pub struct LogAppendMessage {
    pub schema_version: &'static str,
    pub timestamp_ms: u64,
    pub monotonic_ms: u64,
    pub sequence: u64,
    #[serde(rename = "type")]
    pub message_type: &'static str,
    pub entries: Vec<LogEntry>,
}

pub async fn ws_handler(
    AxumState(app_state): AxumState<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

fn hello_message(app_state: &AppState) -> HandshakeHello {
    HandshakeHello {
        schema_version: SCHEMA_VERSION,
        timestamp_ms: now_epoch_ms(),
        monotonic_ms: monotonic_ms(app_state.start_instant),
        sequence: next_sequence(app_state.sequence.as_ref()),
        message_type: "handshake_hello",
        server_version: env!("CARGO_PKG_VERSION"),
        capabilities: vec!["state_update", "samples_window", "log_append"],
    }
}

async fn handle_socket(mut socket: WebSocket, app_state: AppState) {
    info!("ws client connected");
    let mut rx = app_state.tx.subscribe();

    match serde_json::to_string(&hello_message(&app_state)) {
        Ok(payload) => {
            if socket.send(Message::Text(payload)).await.is_err() {
                return;
            }
        }
        Err(err) => {
            warn!(?err, "handshake serialization failed");
            return;
        }
    }

    loop {
        tokio::select! {
            broadcasted = rx.recv() => match broadcasted {
                Ok(payload) => {
                    if socket.send(Message::Text(payload)).await.is_err() {
                        break;
                    }
                }
                // A lagged client misses intermediate frames only; the
                // next state_update resynchronizes it.
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "ws client lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            frame = socket.next() => match frame {
                Some(Ok(Message::Ping(payload))) => {
                    if socket.send(Message::Pong(payload)).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                // Commands arrive over the HTTP surface; inbound data
                // frames are dropped.
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    warn!(?err, "ws receive error");
                    break;
                }
            },
        }
    }
    info!("ws client disconnected");
}
