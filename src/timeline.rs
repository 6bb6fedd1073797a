//! Per-vehicle timelines from polled stop ETA boards.
//!
//! The feed reports ETAs stop by stop; each entry carries an arrival-sequence
//! slot that identifies the vehicle serving it. Grouping entries by slot and
//! sorting by arrival instant gives one chronological timeline per vehicle,
//! from which a raw segment progress can be interpolated.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::progress::RawReading;

/// How far before its first observed stop a vehicle is assumed to depart.
///
/// Used to show an approach indicator for vehicles that have not reached any
/// stop on the board yet.
const VIRTUAL_DEPARTURE_MINUTES: i64 = 30;

/// One ETA listing on a stop's board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtaEntry {
    /// RFC-3339 arrival estimate, absent when the feed has none.
    pub eta: Option<String>,
    /// Arrival-sequence slot; identifies the vehicle across stops.
    pub eta_seq: u32,
}

/// A route stop together with its current ETA listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopBoard {
    pub stop_id: String,
    /// Ordering position of the stop along the route direction.
    pub seq: u32,
    pub etas: Vec<EtaEntry>,
}

/// A single (stop, arrival instant) point on a vehicle's timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelinePoint {
    pub stop_id: String,
    pub seq: u32,
    pub eta: DateTime<Utc>,
}

/// Groups parseable ETAs by arrival-sequence slot.
///
/// Entries with a missing or malformed timestamp are skipped; a bad ETA is
/// stale data, not an error. Each returned timeline is sorted by arrival
/// instant ascending.
pub fn build_timelines(boards: &[StopBoard]) -> HashMap<u32, Vec<TimelinePoint>> {
    let mut timelines: HashMap<u32, Vec<TimelinePoint>> = HashMap::new();

    for board in boards {
        for entry in &board.etas {
            let Some(raw) = entry.eta.as_deref() else {
                continue;
            };
            let Ok(parsed) = DateTime::parse_from_rfc3339(raw) else {
                continue;
            };

            timelines.entry(entry.eta_seq).or_default().push(TimelinePoint {
                stop_id: board.stop_id.clone(),
                seq: board.seq,
                eta: parsed.with_timezone(&Utc),
            });
        }
    }

    for timeline in timelines.values_mut() {
        timeline.sort_by(|a, b| a.eta.cmp(&b.eta));
    }

    timelines
}

/// Derives a raw progress reading from a sorted timeline.
///
/// The next point is the first arrival at or after `now` (the last point when
/// every arrival is in the past); the point before it, if any, is the previous
/// stop. Progress interpolates between the two arrival instants. A vehicle
/// with no previous point gets a synthetic departure 30 minutes ahead of its
/// first stop, so it shows as approaching instead of undefined.
///
/// Returns `None` for an empty timeline.
pub fn derive_reading(timeline: &[TimelinePoint], now: DateTime<Utc>) -> Option<RawReading> {
    let next_index = timeline
        .iter()
        .position(|point| point.eta >= now)
        .unwrap_or(timeline.len().checked_sub(1)?);
    let next = &timeline[next_index];
    let prev = next_index.checked_sub(1).map(|index| &timeline[index]);

    let progress = match prev {
        Some(prev) => {
            let span = next.eta - prev.eta;
            if span > Duration::zero() {
                let elapsed = (now - prev.eta).num_milliseconds() as f64;
                (elapsed / span.num_milliseconds() as f64).clamp(0.0, 1.0)
            } else {
                // Past the last distinct arrival.
                1.0
            }
        }
        None => {
            let virtual_departure = next.eta - Duration::minutes(VIRTUAL_DEPARTURE_MINUTES);
            let total = (next.eta - virtual_departure).num_milliseconds() as f64;
            let elapsed = (now - virtual_departure).num_milliseconds() as f64;
            (elapsed / total).clamp(0.0, 1.0)
        }
    };

    Some(RawReading {
        progress,
        next_stop_seq: next.seq,
        next_stop_id: next.stop_id.clone(),
        prev_stop_seq: prev.map(|point| point.seq),
        prev_stop_id: prev.map(|point| point.stop_id.clone()),
    })
}
