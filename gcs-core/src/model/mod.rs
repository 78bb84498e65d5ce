// Data models shared by the simulator and its consumers.

mod snapshot;

pub use snapshot::{GeoPoint, TelemetrySnapshot};
