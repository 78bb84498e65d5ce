// Operator control surface: drive pad, speed lever, servos, target lock.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

pub const SERVO_RANGE: RangeInclusive<i16> = 0..=180;
pub const PAN_RANGE: RangeInclusive<i16> = -90..=90;
pub const TILT_RANGE: RangeInclusive<i16> = -45..=45;

/// Last drive-pad command. Drive commands are acknowledged in the mission
/// log; forward motion itself is governed by the speed lever.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveCommand {
    #[default]
    Stop,
    Forward,
    Back,
    Left,
    Right,
    Circle,
}

impl DriveCommand {
    /// Command mnemonic used in `CMD ->` log lines.
    pub fn log_label(&self) -> &'static str {
        match self {
            DriveCommand::Stop => "STOP",
            DriveCommand::Forward => "MOVE_FORWARD",
            DriveCommand::Back => "MOVE_BACK",
            DriveCommand::Left => "TURN_LEFT",
            DriveCommand::Right => "TURN_RIGHT",
            DriveCommand::Circle => "CIRCULAR_MOTION",
        }
    }
}

/// Complete control-panel state, published on the control watch channel
/// and echoed back by the control endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControlState {
    pub drive: DriveCommand,
    /// Raw speed lever, 0..=255.
    pub speed_lever: u8,
    pub servo_deg: i16,
    pub pan_deg: i16,
    pub tilt_deg: i16,
    pub locked: bool,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            drive: DriveCommand::Stop,
            speed_lever: 150,
            servo_deg: 90,
            pan_deg: 0,
            tilt_deg: 0,
            locked: false,
        }
    }
}

impl ControlState {
    /// Lever position mapped to the [0, 1] throttle fraction the telemetry
    /// source consumes.
    pub fn speed_fraction(&self) -> f64 {
        f64::from(self.speed_lever) / 255.0
    }
}
