// Shared constants for server timing, buffers, and file layout.

pub const SCHEMA_VERSION: &str = "1.0";
pub const STATE_INTERVAL_MS: u64 = 500;
pub const WINDOW_INTERVAL_MS: u64 = 1_000;
pub const WINDOW_DURATION_MS: u64 = 60_000;
pub const WINDOW_STRIDE_MS: u64 = 1_000;
pub const LOG_INTERVAL_MS: u64 = 500;
pub const SAMPLE_BUFFER_CAP: usize = 600;
pub const MISSION_LOG_CAP: usize = 2_000;
pub const LOG_FILE: &str = "mission_log.txt";
