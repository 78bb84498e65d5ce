// Snapshot hand-off and application into the shared store.

use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};

use gcs_core::error::SinkError;
use gcs_core::model::TelemetrySnapshot;
use gcs_core::sink::TelemetrySink;

use crate::app::GcsStore;
use crate::model::TelemetrySample;

/// Bridges the source's synchronous dispatch onto the async side of the
/// server. `on_snapshot` queues and returns; the apply task drains the
/// queue in dispatch order.
pub struct QueueSink {
    tx: mpsc::UnboundedSender<TelemetrySnapshot>,
}

impl QueueSink {
    pub fn new(tx: mpsc::UnboundedSender<TelemetrySnapshot>) -> Self {
        Self { tx }
    }
}

impl TelemetrySink for QueueSink {
    fn name(&self) -> &str {
        "snapshot-queue"
    }

    fn on_snapshot(&mut self, snapshot: &TelemetrySnapshot) -> Result<(), SinkError> {
        self.tx
            .send(*snapshot)
            .map_err(|_| SinkError::new("snapshot queue closed"))
    }
}

/// Folds one snapshot into the store: latest reading, chart sample,
/// traveled path, and the per-tick mission log line.
pub async fn apply_snapshot(store: &Arc<RwLock<GcsStore>>, snapshot: TelemetrySnapshot) {
    let mut store = store.write().await;
    store.samples.push(TelemetrySample::from_snapshot(&snapshot));
    store.path.record(snapshot.position);
    store.log.record_snapshot(&snapshot);
    store.latest = Some(snapshot);
}
