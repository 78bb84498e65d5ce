// Telemetry source lifecycle: configuration, ticking, and fan-out.
// Invariants: a stopped source never advances or dispatches; at most one
// snapshot is in flight at a time; every produced snapshot reaches the
// subscribed sinks before `tick` returns.

use tracing::info;

use crate::config::SimConfig;
use crate::error::{ConfigError, SubscribeError};
use crate::model::TelemetrySnapshot;
use crate::sim::Simulator;
use crate::sink::{SinkRegistry, SubscriptionId, TelemetrySink};

/// Two-state lifecycle. `start` and `stop` are idempotent and report the
/// state in effect afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceState {
    Stopped,
    Running,
}

/// Owns the simulation state and the sink registry. The source itself is
/// synchronous; a driving loop calls `tick` at the configured cadence and
/// may live on whatever runtime the embedder prefers.
pub struct TelemetrySource {
    config: SimConfig,
    simulator: Simulator,
    sinks: SinkRegistry,
    state: SourceState,
    control_input: Option<f64>,
    latest: Option<TelemetrySnapshot>,
}

impl TelemetrySource {
    /// Builds a stopped source from a validated configuration.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let simulator = Simulator::new(&config);
        Ok(Self {
            config,
            simulator,
            sinks: SinkRegistry::new(),
            state: SourceState::Stopped,
            control_input: None,
            latest: None,
        })
    }

    /// Replaces the simulation parameters and re-homes the state vector.
    /// A rejected configuration leaves the source exactly as it was,
    /// including its run state. Subscriptions are never touched.
    pub fn configure(&mut self, config: SimConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let floor = self.simulator.timestamp_floor();
        let mut simulator = Simulator::new(&config);
        simulator.set_timestamp_floor(floor);
        self.simulator = simulator;
        self.config = config;
        Ok(())
    }

    pub fn start(&mut self) -> SourceState {
        if self.state == SourceState::Stopped {
            self.state = SourceState::Running;
            info!("telemetry source started");
        }
        self.state
    }

    pub fn stop(&mut self) -> SourceState {
        if self.state == SourceState::Running {
            self.state = SourceState::Stopped;
            info!("telemetry source stopped");
        }
        self.state
    }

    pub fn state(&self) -> SourceState {
        self.state
    }

    /// Sets the commanded throttle fraction, clamped to [0, 1]. Non-finite
    /// input is ignored.
    pub fn set_control_input(&mut self, fraction: f64) {
        if fraction.is_finite() {
            self.control_input = Some(fraction.clamp(0.0, 1.0));
        }
    }

    /// Reverts to the configured `speed_bias`.
    pub fn clear_control_input(&mut self) {
        self.control_input = None;
    }

    /// Control fraction that the next tick will use.
    pub fn control_input(&self) -> f64 {
        self.control_input.unwrap_or(self.config.speed_bias)
    }

    /// Advances one tick and dispatches the snapshot to every sink before
    /// returning it. Returns `None` without side effects while stopped.
    pub fn tick(&mut self, now_ms: u64) -> Option<TelemetrySnapshot> {
        if self.state != SourceState::Running {
            return None;
        }
        let control = self.control_input();
        let snapshot = self.simulator.advance(&self.config, control, now_ms);
        self.sinks.dispatch(&snapshot);
        self.latest = Some(snapshot);
        Some(snapshot)
    }

    pub fn subscribe(
        &mut self,
        sink: Box<dyn TelemetrySink>,
    ) -> Result<SubscriptionId, SubscribeError> {
        self.sinks.subscribe(sink)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.sinks.unsubscribe(id)
    }

    /// Re-homes the vehicle to the configured start position with a full
    /// battery and zeroed odometer. Run state, control input, and
    /// subscriptions are left alone.
    pub fn reset(&mut self) {
        self.simulator.reset(&self.config);
        self.latest = None;
        info!("telemetry source reset to start position");
    }

    /// Most recent snapshot produced since construction or `reset`.
    pub fn latest(&self) -> Option<&TelemetrySnapshot> {
        self.latest.as_ref()
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }
}
