//! Per-vehicle smoothed-state registry.
//!
//! The registry owns the `ProgressState` map between polls; the smoothing
//! itself stays pure. One call to [`VehicleRegistry::update_from_poll`] per
//! poll cycle runs every vehicle through the smoother and sweeps out vehicles
//! that dropped off the feed, so no smoothing artifacts outlive their vehicle.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::progress::{ProgressState, smooth_progress};
use crate::timeline::{StopBoard, build_timelines, derive_reading};

/// Below this progress a vehicle still counts as being at its previous stop.
const STOP_ASSIGN_THRESHOLD: f64 = 0.5;

/// Display-ready position of one vehicle after a poll cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleMarker {
    /// Arrival-sequence slot from the feed.
    pub vehicle_id: u32,
    pub progress: f64,
    pub next_stop_seq: u32,
    pub next_stop_id: String,
    pub prev_stop_seq: Option<u32>,
    pub prev_stop_id: Option<String>,
}

impl VehicleMarker {
    /// The stop this vehicle should be counted at: the previous stop while
    /// still in the first half of the segment, otherwise the next stop.
    pub fn assigned_stop(&self) -> (u32, &str) {
        if let (Some(seq), Some(id)) = (self.prev_stop_seq, self.prev_stop_id.as_deref()) {
            if self.progress < STOP_ASSIGN_THRESHOLD {
                return (seq, id);
            }
        }
        (self.next_stop_seq, self.next_stop_id.as_str())
    }
}

/// Errors from registry persistence.
#[derive(Debug)]
pub enum PersistError {
    Io(io::Error),
    Json(serde_json::Error),
}

impl From<io::Error> for PersistError {
    fn from(err: io::Error) -> Self {
        PersistError::Io(err)
    }
}

impl From<serde_json::Error> for PersistError {
    fn from(err: serde_json::Error) -> Self {
        PersistError::Json(err)
    }
}

/// Smoothed state for every vehicle currently observed on the feed.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct VehicleRegistry {
    states: HashMap<u32, ProgressState>,
}

impl VehicleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, vehicle_id: u32) -> Option<&ProgressState> {
        self.states.get(&vehicle_id)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Forget every tracked vehicle (e.g. when the route direction changes).
    pub fn clear(&mut self) {
        self.states.clear();
    }

    /// Runs one full poll cycle.
    ///
    /// Builds per-vehicle timelines from the boards, smooths each vehicle
    /// against its stored state, persists the new states, and evicts vehicles
    /// absent from this poll. Markers come back sorted by vehicle id.
    ///
    /// Calls must be made in increasing `now` order; the registry does not
    /// defend against backdated polls.
    pub fn update_from_poll(
        &mut self,
        boards: &[StopBoard],
        now: DateTime<Utc>,
    ) -> Vec<VehicleMarker> {
        let timelines = build_timelines(boards);

        let mut markers = Vec::with_capacity(timelines.len());
        for (&vehicle_id, timeline) in &timelines {
            let Some(reading) = derive_reading(timeline, now) else {
                continue;
            };

            let state = smooth_progress(reading, self.states.get(&vehicle_id), now);
            markers.push(VehicleMarker {
                vehicle_id,
                progress: state.progress,
                next_stop_seq: state.next_stop_seq,
                next_stop_id: state.next_stop_id.clone(),
                prev_stop_seq: state.prev_stop_seq,
                prev_stop_id: state.prev_stop_id.clone(),
            });
            self.states.insert(vehicle_id, state);
        }

        let before = self.states.len();
        self.states
            .retain(|vehicle_id, _| timelines.contains_key(vehicle_id));
        let evicted = before - self.states.len();

        markers.sort_by_key(|marker| marker.vehicle_id);

        debug!(
            stops = boards.len(),
            vehicles = markers.len(),
            evicted,
            "poll cycle applied"
        );

        markers
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer(writer, self)?;
        Ok(())
    }
}
