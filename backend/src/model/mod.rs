// Server-side data models: chart samples, control surface, mission plan.

mod control;
mod mission;
mod sample;

pub use control::{ControlState, DriveCommand, PAN_RANGE, SERVO_RANGE, TILT_RANGE};
pub use mission::{MissionPlan, Waypoint};
pub use sample::TelemetrySample;
