// Background tasks publishing state, chart windows, and log lines.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch, RwLock};
use tokio::time::{self, Instant};

use crate::app::GcsStore;
use crate::constants::{
    LOG_INTERVAL_MS, SCHEMA_VERSION, STATE_INTERVAL_MS, WINDOW_DURATION_MS, WINDOW_INTERVAL_MS,
    WINDOW_STRIDE_MS,
};
use crate::model::{ControlState, TelemetrySample};
use crate::utils::{monotonic_ms, next_sequence, now_epoch_ms};
use crate::ws::{LogAppendMessage, SamplesWindow, SamplesWindowMessage, StateUpdateMessage};

pub async fn state_update_task(
    store: Arc<RwLock<GcsStore>>,
    control_rx: watch::Receiver<ControlState>,
    sim_active: Arc<AtomicBool>,
    tx: broadcast::Sender<String>,
    sequence: Arc<AtomicU64>,
    start: Instant,
) {
    let mut interval = time::interval(Duration::from_millis(STATE_INTERVAL_MS));
    loop {
        interval.tick().await;
        let (latest, locked) = {
            let store = store.read().await;
            (store.latest, store.path.locked())
        };

        let Some(snapshot) = latest else {
            continue;
        };

        let message = StateUpdateMessage {
            schema_version: SCHEMA_VERSION,
            timestamp_ms: now_epoch_ms(),
            monotonic_ms: monotonic_ms(start),
            sequence: next_sequence(sequence.as_ref()),
            message_type: "state_update",
            snapshot,
            sim_active: sim_active.load(Ordering::Relaxed),
            locked,
            control: *control_rx.borrow(),
        };

        if let Ok(payload) = serde_json::to_string(&message) {
            let _ = tx.send(payload);
        }
    }
}

pub async fn samples_window_task(
    store: Arc<RwLock<GcsStore>>,
    tx: broadcast::Sender<String>,
    sequence: Arc<AtomicU64>,
    start: Instant,
) {
    let mut interval = time::interval(Duration::from_millis(WINDOW_INTERVAL_MS));
    loop {
        interval.tick().await;
        let now_ms = monotonic_ms(start);
        let start_ms = now_ms.saturating_sub(WINDOW_DURATION_MS);
        let samples = {
            let store = store.read().await;
            if store.samples.is_empty() {
                continue;
            }
            store.samples.to_vec_ordered()
        };

        let window_samples = decimate_window(&samples, start_ms, now_ms, WINDOW_STRIDE_MS);
        if window_samples.is_empty() {
            continue;
        }

        let window = SamplesWindow {
            start_ms,
            end_ms: now_ms,
            stride_ms: WINDOW_STRIDE_MS,
            samples: window_samples,
        };

        let message = SamplesWindowMessage {
            schema_version: SCHEMA_VERSION,
            timestamp_ms: now_epoch_ms(),
            monotonic_ms: monotonic_ms(start),
            sequence: next_sequence(sequence.as_ref()),
            message_type: "samples_window",
            window,
            decimated: true,
        };

        if let Ok(payload) = serde_json::to_string(&message) {
            let _ = tx.send(payload);
        }
    }
}

/// Keeps the samples that fall inside [start_ms, end_ms] while enforcing
/// a minimum spacing of `stride_ms` between kept samples.
pub fn decimate_window(
    samples: &[TelemetrySample],
    start_ms: u64,
    end_ms: u64,
    stride_ms: u64,
) -> Vec<TelemetrySample> {
    let mut out = Vec::new();
    let mut last_t = None;
    for sample in samples {
        if sample.t_ms < start_ms || sample.t_ms > end_ms {
            continue;
        }
        let emit = match last_t {
            Some(prev) => sample.t_ms.saturating_sub(prev) >= stride_ms,
            None => true,
        };
        if emit {
            last_t = Some(sample.t_ms);
            out.push(sample.clone());
        }
    }
    out
}

/// Streams mission log lines appended since the previous pass.
pub async fn log_stream_task(
    store: Arc<RwLock<GcsStore>>,
    tx: broadcast::Sender<String>,
    sequence: Arc<AtomicU64>,
    start: Instant,
) {
    let mut interval = time::interval(Duration::from_millis(LOG_INTERVAL_MS));
    let mut streamed_seq = 0u64;
    loop {
        interval.tick().await;
        let entries = {
            let store = store.read().await;
            store.log.entries_after(streamed_seq)
        };
        if entries.is_empty() {
            continue;
        }
        if let Some(last) = entries.last() {
            streamed_seq = last.seq;
        }

        let message = LogAppendMessage {
            schema_version: SCHEMA_VERSION,
            timestamp_ms: now_epoch_ms(),
            monotonic_ms: monotonic_ms(start),
            sequence: next_sequence(sequence.as_ref()),
            message_type: "log_append",
            entries,
        };

        if let Ok(payload) = serde_json::to_string(&message) {
            let _ = tx.send(payload);
        }
    }
}
