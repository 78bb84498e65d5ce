// Traveled-path consumer backing the map overlay.
// Invariants: the point sequence only grows while attached; consecutive
// duplicates are kept so the polyline mirrors the tick history.

use crate::error::SinkError;
use crate::model::{GeoPoint, TelemetrySnapshot};
use crate::sink::TelemetrySink;

/// Append-only polyline of visited positions plus the current marker.
#[derive(Debug, Default)]
pub struct PathTracker {
    points: Vec<GeoPoint>,
    marker: Option<GeoPoint>,
    locked: bool,
}

impl PathTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a position and moves the marker onto it.
    pub fn record(&mut self, position: GeoPoint) {
        self.points.push(position);
        self.marker = Some(position);
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Latest recorded position, if any tick has been observed.
    pub fn marker(&self) -> Option<GeoPoint> {
        self.marker
    }

    /// Target-lock flag shown next to the marker.
    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub fn locked(&self) -> bool {
        self.locked
    }
}

impl TelemetrySink for PathTracker {
    fn name(&self) -> &str {
        "path-tracker"
    }

    fn on_snapshot(&mut self, snapshot: &TelemetrySnapshot) -> Result<(), SinkError> {
        self.record(snapshot.position);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_every_point_including_duplicates() {
        let mut path = PathTracker::new();
        let a = GeoPoint::new(28.6, 77.2);
        path.record(a);
        path.record(a);
        path.record(GeoPoint::new(28.7, 77.3));
        assert_eq!(path.len(), 3);
        assert_eq!(path.points()[0], path.points()[1]);
    }

    #[test]
    fn marker_tracks_last_point() {
        let mut path = PathTracker::new();
        assert_eq!(path.marker(), None);
        path.record(GeoPoint::new(1.0, 2.0));
        path.record(GeoPoint::new(3.0, 4.0));
        assert_eq!(path.marker(), Some(GeoPoint::new(3.0, 4.0)));
    }
}
