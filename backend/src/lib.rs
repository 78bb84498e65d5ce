// Crate root for the rover ground-station server modules.

pub mod app;
pub mod buffers;
pub mod constants;
pub mod http;
pub mod model;
pub mod sim;
pub mod tasks;
pub mod telemetry;
pub mod utils;
pub mod ws;
