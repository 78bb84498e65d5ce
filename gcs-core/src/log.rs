// Bounded mission log fed by telemetry ticks and operator commands.
// Invariants: sequence numbers are assigned once and never reused, even
// across `clear`; the entry store holds at most `cap` lines.

use std::collections::VecDeque;

use serde::Serialize;

use crate::error::SinkError;
use crate::model::TelemetrySnapshot;
use crate::sink::TelemetrySink;

pub const DEFAULT_LOG_CAP: usize = 2_000;

/// One mission log line. `seq` orders entries globally; `t_ms` is the
/// caller's clock at append time.
#[derive(Clone, Debug, Serialize)]
pub struct LogEntry {
    pub seq: u64,
    pub t_ms: u64,
    pub line: String,
}

/// FIFO of recent log lines. Old entries are evicted once the capacity
/// is reached.
#[derive(Debug)]
pub struct MissionLog {
    entries: VecDeque<LogEntry>,
    cap: usize,
    next_seq: u64,
}

impl MissionLog {
    pub fn new(cap: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cap: cap.max(1),
            next_seq: 0,
        }
    }

    /// Appends a line and returns its sequence number.
    pub fn append(&mut self, t_ms: u64, line: impl Into<String>) -> u64 {
        self.next_seq += 1;
        if self.entries.len() >= self.cap {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            seq: self.next_seq,
            t_ms,
            line: line.into(),
        });
        self.next_seq
    }

    /// Formats and appends the standard per-tick telemetry line.
    pub fn record_snapshot(&mut self, snapshot: &TelemetrySnapshot) {
        let line = format!(
            "Telemetry update | Bat:{:.1}% Speed:{:.2}m/s Dist:{:.1}m",
            snapshot.battery_pct, snapshot.speed_mps, snapshot.distance_m
        );
        self.append(snapshot.timestamp_ms, line);
    }

    /// Entries with a sequence number strictly greater than `seq`, oldest
    /// first. Entries evicted by the capacity bound are gone for good.
    pub fn entries_after(&self, seq: u64) -> Vec<LogEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.seq > seq)
            .cloned()
            .collect()
    }

    /// Up to `limit` most recent entries, oldest first.
    pub fn tail(&self, limit: usize) -> Vec<LogEntry> {
        let skip = self.entries.len().saturating_sub(limit);
        self.entries.iter().skip(skip).cloned().collect()
    }

    /// Highest sequence number handed out so far.
    pub fn last_seq(&self) -> u64 {
        self.next_seq
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Full log text for saving to disk, one line per entry with the
    /// offset clock rendered in seconds.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&format!(
                "[{:9.1}s] {}\n",
                entry.t_ms as f64 / 1_000.0,
                entry.line
            ));
        }
        out
    }

    /// Drops every entry, then records that the log was cleared.
    pub fn clear(&mut self, t_ms: u64) {
        self.entries.clear();
        self.append(t_ms, "Log cleared");
    }
}

impl Default for MissionLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAP)
    }
}

impl TelemetrySink for MissionLog {
    fn name(&self) -> &str {
        "mission-log"
    }

    fn on_snapshot(&mut self, snapshot: &TelemetrySnapshot) -> Result<(), SinkError> {
        self.record_snapshot(snapshot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_evicts_oldest_entries() {
        let mut log = MissionLog::new(3);
        for i in 0..5 {
            log.append(i, format!("line {i}"));
        }
        assert_eq!(log.len(), 3);
        let entries = log.entries_after(0);
        assert_eq!(entries[0].line, "line 2");
        assert_eq!(entries[2].line, "line 4");
    }

    #[test]
    fn sequence_numbers_survive_clear() {
        let mut log = MissionLog::new(10);
        log.append(0, "first");
        log.append(1, "second");
        log.clear(2);
        assert_eq!(log.len(), 1);
        let entries = log.entries_after(0);
        assert_eq!(entries[0].seq, 3);
        assert_eq!(entries[0].line, "Log cleared");
    }

    #[test]
    fn entries_after_filters_by_sequence() {
        let mut log = MissionLog::new(10);
        let first = log.append(0, "a");
        log.append(1, "b");
        log.append(2, "c");
        let entries = log.entries_after(first);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].line, "b");
    }

    #[test]
    fn tail_returns_most_recent_in_order() {
        let mut log = MissionLog::new(10);
        for i in 0..6 {
            log.append(i, format!("line {i}"));
        }
        let tail = log.tail(2);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].line, "line 4");
        assert_eq!(tail[1].line, "line 5");
    }

    #[test]
    fn telemetry_line_uses_rounded_fields() {
        let mut log = MissionLog::default();
        let snapshot = TelemetrySnapshot {
            timestamp_ms: 1_500,
            battery_pct: 99.92,
            speed_mps: 1.5,
            distance_m: 3.0,
            position: crate::model::GeoPoint::new(28.6, 77.2),
            temperature_c: 20.0,
        };
        log.record_snapshot(&snapshot);
        let entries = log.entries_after(0);
        assert_eq!(
            entries[0].line,
            "Telemetry update | Bat:99.9% Speed:1.50m/s Dist:3.0m"
        );
    }
}
