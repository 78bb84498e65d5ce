// Pluggable snapshot consumers and ordered dispatch.
// Invariants: delivery follows subscription order; a failing sink never
// blocks the remaining sinks or the producer.

use tracing::warn;

use crate::error::{SinkError, SubscribeError};
use crate::model::TelemetrySnapshot;

/// Handle returned by `subscribe`. Removal through a stale or foreign
/// handle is a no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A consumer of telemetry snapshots.
///
/// `on_snapshot` runs on the producer's tick path and must return quickly;
/// implementations that do real work should hand the snapshot off to a
/// queue instead of processing it inline.
pub trait TelemetrySink: Send {
    /// Stable identity of this sink. Two sinks with the same name cannot
    /// be subscribed at the same time.
    fn name(&self) -> &str;

    /// Consume one snapshot. The reference is only valid for the duration
    /// of the call; copy whatever outlives it.
    fn on_snapshot(&mut self, snapshot: &TelemetrySnapshot) -> Result<(), SinkError>;
}

struct Subscription {
    id: SubscriptionId,
    sink: Box<dyn TelemetrySink>,
}

/// Ordered set of subscriptions owned by a telemetry source.
#[derive(Default)]
pub struct SinkRegistry {
    subscriptions: Vec<Subscription>,
    next_id: u64,
}

impl SinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sink to the delivery order. Rejects a second sink bearing
    /// a name that is already subscribed.
    pub fn subscribe(
        &mut self,
        sink: Box<dyn TelemetrySink>,
    ) -> Result<SubscriptionId, SubscribeError> {
        if self
            .subscriptions
            .iter()
            .any(|sub| sub.sink.name() == sink.name())
        {
            return Err(SubscribeError::DuplicateSubscription {
                name: sink.name().to_string(),
            });
        }
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscriptions.push(Subscription { id, sink });
        Ok(id)
    }

    /// Drops the subscription with the given handle. Returns whether a
    /// subscription was actually removed; unknown handles are ignored.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|sub| sub.id != id);
        self.subscriptions.len() != before
    }

    /// Delivers one snapshot to every sink in subscription order. A sink
    /// error is logged and delivery moves on to the next sink.
    pub fn dispatch(&mut self, snapshot: &TelemetrySnapshot) {
        for sub in &mut self.subscriptions {
            if let Err(err) = sub.sink.on_snapshot(snapshot) {
                warn!(sink = sub.sink.name(), %err, "sink rejected snapshot, continuing delivery");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}
