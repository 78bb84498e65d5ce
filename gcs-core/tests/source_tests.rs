// Behavioral tests for the telemetry source and its sink pipeline.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use gcs_core::config::SimConfig;
use gcs_core::error::{ConfigError, SinkError, SubscribeError};
use gcs_core::log::MissionLog;
use gcs_core::model::{GeoPoint, TelemetrySnapshot};
use gcs_core::path::PathTracker;
use gcs_core::sink::TelemetrySink;
use gcs_core::source::{SourceState, TelemetrySource};

/// Pushes every delivery into a shared vec, tagged with the sink's label,
/// so tests can assert on cross-sink ordering.
struct RecordingSink {
    label: &'static str,
    observed: Arc<Mutex<Vec<(&'static str, TelemetrySnapshot)>>>,
}

impl TelemetrySink for RecordingSink {
    fn name(&self) -> &str {
        self.label
    }

    fn on_snapshot(&mut self, snapshot: &TelemetrySnapshot) -> Result<(), SinkError> {
        self.observed.lock().unwrap().push((self.label, *snapshot));
        Ok(())
    }
}

struct FailingSink;

impl TelemetrySink for FailingSink {
    fn name(&self) -> &str {
        "failing"
    }

    fn on_snapshot(&mut self, _snapshot: &TelemetrySnapshot) -> Result<(), SinkError> {
        Err(SinkError::new("always fails"))
    }
}

/// Forwards to an inner sink behind a lock so the test can keep a handle
/// to state the source otherwise owns.
struct SharedSink<T> {
    label: &'static str,
    inner: Arc<Mutex<T>>,
}

impl<T: TelemetrySink> TelemetrySink for SharedSink<T> {
    fn name(&self) -> &str {
        self.label
    }

    fn on_snapshot(&mut self, snapshot: &TelemetrySnapshot) -> Result<(), SinkError> {
        self.inner.lock().unwrap().on_snapshot(snapshot)
    }
}

/// Deterministic config with noise disabled, so positions and temperature
/// are exactly predictable.
fn quiet_config() -> SimConfig {
    SimConfig {
        tick_interval: Duration::from_secs(1),
        position_jitter_deg: 0.0,
        temperature_noise_c: 0.0,
        seed: Some(7),
        ..SimConfig::default()
    }
}

fn running_source(config: SimConfig) -> TelemetrySource {
    let mut source = TelemetrySource::new(config).unwrap();
    source.start();
    source
}

#[test]
fn stopped_source_produces_nothing() {
    let mut source = TelemetrySource::new(quiet_config()).unwrap();
    assert_eq!(source.state(), SourceState::Stopped);
    assert_eq!(source.tick(1_000), None);
    assert!(source.latest().is_none());
}

#[test]
fn start_and_stop_are_idempotent() {
    let mut source = TelemetrySource::new(quiet_config()).unwrap();
    assert_eq!(source.start(), SourceState::Running);
    assert_eq!(source.start(), SourceState::Running);
    assert!(source.tick(1_000).is_some());
    assert_eq!(source.stop(), SourceState::Stopped);
    assert_eq!(source.stop(), SourceState::Stopped);
    assert_eq!(source.tick(2_000), None);
}

#[test]
fn full_throttle_drain_matches_reference_values() {
    let mut source = running_source(quiet_config());
    source.set_control_input(1.0);

    let first = source.tick(1_000).unwrap();
    assert!((first.speed_mps - 1.5).abs() < 1e-9);
    assert!((first.distance_m - 1.5).abs() < 1e-9);
    assert!((first.battery_pct - 99.92).abs() < 1e-9);

    let second = source.tick(2_000).unwrap();
    assert!((second.speed_mps - 1.5).abs() < 1e-9);
    assert!((second.distance_m - 3.0).abs() < 1e-9);
    assert!((second.battery_pct - 99.84).abs() < 1e-9);
}

#[test]
fn battery_clamps_to_zero_instead_of_going_negative() {
    let config = SimConfig {
        initial_battery_pct: 0.03,
        ..quiet_config()
    };
    let mut source = running_source(config);
    source.set_control_input(1.0);
    let snapshot = source.tick(1_000).unwrap();
    assert_eq!(snapshot.battery_pct, 0.0);
}

#[test]
fn clamps_hold_over_a_long_run() {
    let config = SimConfig {
        position_jitter_deg: 1e-6,
        temperature_noise_c: 1.5,
        seed: Some(99),
        tick_interval: Duration::from_secs(1),
        ..SimConfig::default()
    };
    let max_speed = config.max_speed_mps;
    let mut source = running_source(config);
    source.set_control_input(1.0);

    let mut previous_distance = 0.0;
    let mut previous_timestamp = 0;
    let mut last_battery = 100.0;
    for i in 0..2_000u64 {
        let snapshot = source.tick(i * 1_000).unwrap();
        assert!((0.0..=100.0).contains(&snapshot.battery_pct));
        assert!((0.0..=max_speed).contains(&snapshot.speed_mps));
        assert!(snapshot.distance_m >= previous_distance);
        assert!(snapshot.timestamp_ms > previous_timestamp || i == 0);
        previous_distance = snapshot.distance_m;
        previous_timestamp = snapshot.timestamp_ms;
        last_battery = snapshot.battery_pct;
    }
    // 2000 ticks at full throttle burn well past a full charge.
    assert_eq!(last_battery, 0.0);
}

#[test]
fn timestamps_stay_strictly_increasing_on_a_stalled_clock() {
    let mut source = running_source(quiet_config());
    let first = source.tick(5_000).unwrap();
    let second = source.tick(5_000).unwrap();
    let third = source.tick(4_000).unwrap();
    assert_eq!(first.timestamp_ms, 5_000);
    assert_eq!(second.timestamp_ms, 5_001);
    assert_eq!(third.timestamp_ms, 5_002);
}

#[test]
fn same_seed_replays_an_identical_sequence() {
    let config = SimConfig {
        seed: Some(42),
        tick_interval: Duration::from_secs(1),
        ..SimConfig::default()
    };
    let mut a = running_source(config.clone());
    let mut b = running_source(config);
    a.set_control_input(0.6);
    b.set_control_input(0.6);

    for i in 0..50u64 {
        let now = 1_000 + i * 1_000;
        assert_eq!(a.tick(now), b.tick(now));
    }
}

#[test]
fn different_seeds_diverge() {
    let base = SimConfig {
        tick_interval: Duration::from_secs(1),
        ..SimConfig::default()
    };
    let mut a = running_source(SimConfig {
        seed: Some(1),
        ..base.clone()
    });
    let mut b = running_source(SimConfig {
        seed: Some(2),
        ..base
    });
    let snap_a = a.tick(1_000).unwrap();
    let snap_b = b.tick(1_000).unwrap();
    assert_ne!(snap_a.position, snap_b.position);
}

#[test]
fn sinks_receive_snapshots_in_subscription_order() {
    let observed = Arc::new(Mutex::new(Vec::new()));
    let mut source = running_source(quiet_config());
    source
        .subscribe(Box::new(RecordingSink {
            label: "first",
            observed: observed.clone(),
        }))
        .unwrap();
    source
        .subscribe(Box::new(RecordingSink {
            label: "second",
            observed: observed.clone(),
        }))
        .unwrap();

    let snapshot = source.tick(1_000).unwrap();

    let deliveries = observed.lock().unwrap();
    assert_eq!(deliveries.len(), 2);
    assert_eq!(deliveries[0], ("first", snapshot));
    assert_eq!(deliveries[1], ("second", snapshot));
}

#[test]
fn failing_sink_does_not_block_later_sinks() {
    let observed = Arc::new(Mutex::new(Vec::new()));
    let mut source = running_source(quiet_config());
    source.subscribe(Box::new(FailingSink)).unwrap();
    source
        .subscribe(Box::new(RecordingSink {
            label: "after-failing",
            observed: observed.clone(),
        }))
        .unwrap();

    for i in 1..=3u64 {
        assert!(source.tick(i * 1_000).is_some());
    }
    assert_eq!(observed.lock().unwrap().len(), 3);
}

#[test]
fn duplicate_sink_names_are_rejected() {
    let observed = Arc::new(Mutex::new(Vec::new()));
    let mut source = running_source(quiet_config());
    source
        .subscribe(Box::new(RecordingSink {
            label: "charts",
            observed: observed.clone(),
        }))
        .unwrap();
    let err = source
        .subscribe(Box::new(RecordingSink {
            label: "charts",
            observed: observed.clone(),
        }))
        .unwrap_err();
    assert_eq!(
        err,
        SubscribeError::DuplicateSubscription {
            name: "charts".to_string()
        }
    );
    assert_eq!(source.sink_count(), 1);

    // The original subscription still delivers.
    source.tick(1_000);
    assert_eq!(observed.lock().unwrap().len(), 1);
}

#[test]
fn unsubscribe_is_tolerant_of_unknown_handles() {
    let observed = Arc::new(Mutex::new(Vec::new()));
    let mut source = running_source(quiet_config());
    let id = source
        .subscribe(Box::new(RecordingSink {
            label: "only",
            observed: observed.clone(),
        }))
        .unwrap();

    assert!(source.unsubscribe(id));
    assert!(!source.unsubscribe(id));
    assert_eq!(source.sink_count(), 0);

    source.tick(1_000);
    assert!(observed.lock().unwrap().is_empty());
}

#[test]
fn control_input_is_clamped_and_clearable() {
    let mut source = running_source(quiet_config());
    source.set_control_input(2.5);
    assert_eq!(source.control_input(), 1.0);
    let snapshot = source.tick(1_000).unwrap();
    assert!((snapshot.speed_mps - 1.5).abs() < 1e-9);

    source.set_control_input(-3.0);
    assert_eq!(source.control_input(), 0.0);

    source.set_control_input(f64::NAN);
    assert_eq!(source.control_input(), 0.0);

    source.clear_control_input();
    assert_eq!(source.control_input(), quiet_config().speed_bias);
}

#[test]
fn rejected_configure_leaves_the_source_untouched() {
    let mut source = running_source(quiet_config());
    source.tick(1_000);

    let bad = SimConfig {
        initial_battery_pct: 150.0,
        ..SimConfig::default()
    };
    let err = source.configure(bad).unwrap_err();
    assert_eq!(err, ConfigError::BatteryOutOfRange { value: 150.0 });

    assert_eq!(source.state(), SourceState::Running);
    assert_eq!(source.config(), &quiet_config());
    assert!(source.tick(2_000).is_some());
}

#[test]
fn configure_applies_new_parameters() {
    let mut source = running_source(quiet_config());
    source.tick(1_000);

    let slower = SimConfig {
        max_speed_mps: 0.5,
        ..quiet_config()
    };
    source.configure(slower).unwrap();
    source.set_control_input(1.0);
    let snapshot = source.tick(2_000).unwrap();
    assert!((snapshot.speed_mps - 0.5).abs() < 1e-9);
    // Timestamps keep increasing across reconfiguration.
    assert!(snapshot.timestamp_ms >= 1_001);
}

#[test]
fn reset_rehomes_without_touching_subscriptions() {
    let observed = Arc::new(Mutex::new(Vec::new()));
    let config = quiet_config();
    let home = config.initial_position;
    let mut source = running_source(config);
    source
        .subscribe(Box::new(RecordingSink {
            label: "watcher",
            observed: observed.clone(),
        }))
        .unwrap();
    source.set_control_input(1.0);
    for i in 1..=5u64 {
        source.tick(i * 1_000);
    }

    source.reset();
    assert!(source.latest().is_none());
    assert_eq!(source.state(), SourceState::Running);
    assert_eq!(source.sink_count(), 1);

    source.clear_control_input();
    let snapshot = source.tick(10_000).unwrap();
    assert_eq!(snapshot.speed_mps, 0.0);
    assert_eq!(snapshot.distance_m, 0.0);
    assert_eq!(snapshot.position, home);
    assert!((snapshot.battery_pct - 99.95).abs() < 1e-9);
    assert_eq!(observed.lock().unwrap().len(), 6);
}

#[test]
fn path_tracker_subscription_mirrors_tick_history() {
    let path = Arc::new(Mutex::new(PathTracker::new()));
    let mut source = running_source(quiet_config());
    source
        .subscribe(Box::new(SharedSink {
            label: "map-path",
            inner: path.clone(),
        }))
        .unwrap();

    // Stationary, zero jitter: consecutive positions are identical and
    // every one of them is kept.
    for i in 1..=3u64 {
        source.tick(i * 1_000);
    }

    let path = path.lock().unwrap();
    assert_eq!(path.len(), 3);
    assert_eq!(path.points()[0], path.points()[2]);
    assert_eq!(path.marker(), Some(quiet_config().initial_position));
}

#[test]
fn mission_log_subscription_records_tick_lines() {
    let log = Arc::new(Mutex::new(MissionLog::default()));
    let mut source = running_source(quiet_config());
    source
        .subscribe(Box::new(SharedSink {
            label: "log",
            inner: log.clone(),
        }))
        .unwrap();
    source.set_control_input(1.0);
    source.tick(1_500);

    let log = log.lock().unwrap();
    let entries = log.entries_after(0);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].t_ms, 1_500);
    assert_eq!(
        entries[0].line,
        "Telemetry update | Bat:99.9% Speed:1.50m/s Dist:1.5m"
    );
}

#[test]
fn snapshot_serializes_with_stable_field_names() {
    let snapshot = TelemetrySnapshot {
        timestamp_ms: 42,
        battery_pct: 99.5,
        speed_mps: 1.25,
        distance_m: 10.0,
        position: GeoPoint::new(28.6, 77.2),
        temperature_c: 21.5,
    };
    let value = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(value["timestamp_ms"], 42);
    assert_eq!(value["battery_pct"], 99.5);
    assert_eq!(value["position"]["lat_deg"], 28.6);
    assert_eq!(value["position"]["lon_deg"], 77.2);
    assert_eq!(value["temperature_c"], 21.5);
}
