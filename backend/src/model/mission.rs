// Mission planner state: waypoint list and upload bookkeeping.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub alt_m: f64,
}

impl Waypoint {
    /// Waypoint text used in planner log lines.
    pub fn log_label(&self) -> String {
        format!(
            "WP: {:.6}, {:.6}, Alt {:.0}m",
            self.lat_deg, self.lon_deg, self.alt_m
        )
    }
}

/// Ordered waypoint list. Any edit invalidates a previous upload.
#[derive(Debug, Default)]
pub struct MissionPlan {
    waypoints: Vec<Waypoint>,
    uploaded: bool,
}

impl MissionPlan {
    /// Appends a waypoint and returns the new count.
    pub fn add(&mut self, waypoint: Waypoint) -> usize {
        self.waypoints.push(waypoint);
        self.uploaded = false;
        self.waypoints.len()
    }

    /// Removes the waypoint at `index`, if it exists.
    pub fn remove(&mut self, index: usize) -> Option<Waypoint> {
        if index < self.waypoints.len() {
            self.uploaded = false;
            Some(self.waypoints.remove(index))
        } else {
            None
        }
    }

    /// Drops every waypoint and returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.waypoints.len();
        self.waypoints.clear();
        self.uploaded = false;
        removed
    }

    /// Marks the plan as uploaded. Refuses an empty plan.
    pub fn upload(&mut self) -> bool {
        if self.waypoints.is_empty() {
            return false;
        }
        self.uploaded = true;
        true
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn uploaded(&self) -> bool {
        self.uploaded
    }
}
