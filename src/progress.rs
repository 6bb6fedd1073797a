//! Progress smoothing for tracked vehicles.
//!
//! Raw readings derived from polled ETA data jump around: estimates shift,
//! entries disappear for a cycle, a vehicle briefly appears to move backwards.
//! [`smooth_progress`] turns those readings into a stable position that only
//! moves forward within a segment, easing toward the latest reading instead of
//! jumping, and snapping only when the vehicle genuinely changes segment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Time span over which an eased position fully converges to a new reading.
pub const CONVERGENCE_WINDOW_MS: i64 = 15_000;

/// A raw progress observation for one vehicle on one poll cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReading {
    /// Unclamped fraction of the way from the previous stop to the next.
    pub progress: f64,
    pub next_stop_seq: u32,
    pub next_stop_id: String,
    /// `None` while the vehicle has not passed any observed stop.
    pub prev_stop_seq: Option<u32>,
    pub prev_stop_id: Option<String>,
}

/// Smoothed per-vehicle position, persisted by the caller between polls.
///
/// Carries everything the display layer needs, so it doubles as the result of
/// [`smooth_progress`]. `next_stop_seq` never decreases across successive
/// states for the same vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressState {
    /// Fraction of the way between the previous and next stop, in [0, 1].
    pub progress: f64,
    pub next_stop_seq: u32,
    pub next_stop_id: String,
    pub prev_stop_seq: Option<u32>,
    pub prev_stop_id: Option<String>,
    /// When this state was computed; drives easing on the next update.
    pub timestamp: DateTime<Utc>,
}

fn clamp_progress(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Computes the next smoothed state for a vehicle.
///
/// Pure: persistence of the returned state is the caller's responsibility.
/// Successive calls for one vehicle must be made in increasing `now` order;
/// a backdated `now` is not defended against beyond flooring the elapsed time
/// at zero.
pub fn smooth_progress(
    reading: RawReading,
    previous: Option<&ProgressState>,
    now: DateTime<Utc>,
) -> ProgressState {
    let clamped = clamp_progress(reading.progress);

    let Some(previous) = previous else {
        // First observation: accept the reading verbatim.
        return ProgressState {
            progress: clamped,
            next_stop_seq: reading.next_stop_seq,
            next_stop_id: reading.next_stop_id,
            prev_stop_seq: reading.prev_stop_seq,
            prev_stop_id: reading.prev_stop_id,
            timestamp: now,
        };
    };

    // A lower next-stop sequence means the feed briefly contradicted itself.
    // Keep the previous position rather than jumping the marker backwards.
    if reading.next_stop_seq < previous.next_stop_seq {
        return ProgressState {
            timestamp: now,
            ..previous.clone()
        };
    }

    // New segment (vehicle advanced, or the feed reset tracking): trust the
    // fresh reading immediately. Easing across two different physical
    // segments has no meaning.
    if reading.next_stop_seq != previous.next_stop_seq {
        return ProgressState {
            progress: clamped,
            next_stop_seq: reading.next_stop_seq,
            next_stop_id: reading.next_stop_id,
            prev_stop_seq: reading.prev_stop_seq,
            prev_stop_id: reading.prev_stop_id,
            timestamp: now,
        };
    }

    // Same segment as before: ease toward the new reading.
    let delta = clamped - previous.progress;

    if delta <= 0.0 {
        // Transient regression within the segment. Hold position, but let the
        // reading refresh the previous-stop context when it carries one.
        return ProgressState {
            progress: previous.progress,
            next_stop_seq: previous.next_stop_seq,
            next_stop_id: previous.next_stop_id.clone(),
            prev_stop_seq: reading.prev_stop_seq.or(previous.prev_stop_seq),
            prev_stop_id: reading.prev_stop_id.or_else(|| previous.prev_stop_id.clone()),
            timestamp: now,
        };
    }

    let time_delta = (now - previous.timestamp).num_milliseconds().max(0);
    let alpha = (time_delta as f64 / CONVERGENCE_WINDOW_MS as f64).min(1.0);
    let eased = clamp_progress(previous.progress + delta * alpha);

    ProgressState {
        progress: eased,
        next_stop_seq: reading.next_stop_seq,
        next_stop_id: reading.next_stop_id,
        prev_stop_seq: reading.prev_stop_seq.or(previous.prev_stop_seq),
        prev_stop_id: reading.prev_stop_id.or_else(|| previous.prev_stop_id.clone()),
        timestamp: now,
    }
}
