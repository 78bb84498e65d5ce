// Simulation and telemetry pipeline core for the rover ground station.

pub mod config;
pub mod error;
pub mod log;
pub mod model;
pub mod path;
pub mod sim;
pub mod sink;
pub mod source;
