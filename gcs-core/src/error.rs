// Error taxonomy for configuration, subscription, and sink delivery.

use thiserror::Error;

/// Rejected simulation parameters. The offending field is named so callers
/// can surface it without string matching.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Tick interval of zero would spin the loop without advancing time.
    #[error("tick_interval must be greater than zero")]
    NonPositiveTickInterval,

    /// Initial battery charge outside the displayable percentage range.
    #[error("initial_battery_pct {value} is outside [0, 100]")]
    BatteryOutOfRange { value: f64 },

    /// Default control fraction outside [0, 1].
    #[error("speed_bias {value} is outside [0, 1]")]
    SpeedBiasOutOfRange { value: f64 },

    /// The speed ceiling must be positive for the clamp to make sense.
    #[error("max_speed_mps must be greater than zero, got {value}")]
    NonPositiveMaxSpeed { value: f64 },

    /// Drain and noise parameters are magnitudes and may not be negative.
    #[error("{field} must not be negative, got {value}")]
    NegativeParameter { field: &'static str, value: f64 },
}

/// Subscription rejected by the source.
#[derive(Debug, Error, PartialEq)]
pub enum SubscribeError {
    /// A sink with the same name is already attached.
    #[error("sink {name:?} is already subscribed")]
    DuplicateSubscription { name: String },
}

/// A sink failed to consume a snapshot. Delivery to other sinks continues;
/// the failure is logged and otherwise dropped.
#[derive(Debug, Error)]
#[error("sink failure: {reason}")]
pub struct SinkError {
    pub reason: String,
}

impl SinkError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
