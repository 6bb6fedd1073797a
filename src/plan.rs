//! Planner stop sequences, route metrics, and greedy stop ordering.

use serde::{Deserialize, Serialize};

use crate::geo::{
    self, Coordinate, DEFAULT_AVERAGE_SPEED_KMH, eta_minutes, haversine_distance_km,
};
use crate::locations;
use crate::traits::Located;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopStatus {
    Pending,
    Completed,
}

/// A planner stop. Order within the plan defines the direction of travel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub id: String,
    pub label: String,
    pub coordinate: Coordinate,
    pub notes: Option<String>,
    pub status: StopStatus,
}

impl Located for Stop {
    fn coordinate(&self) -> Coordinate {
        self.coordinate
    }
}

/// One consecutive-pair leg, keyed by the departing stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub stop_id: String,
    pub distance_km: f64,
    pub eta_minutes: f64,
}

/// Derived totals for a stop sequence. Recompute whenever the sequence
/// changes; there is no state of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteMetrics {
    pub total_distance_km: f64,
    pub total_eta_minutes: f64,
    pub completed_stops: usize,
    pub pending_stops: usize,
    pub legs: Vec<RouteLeg>,
}

/// Computes distances, per-leg ETAs, and status counts for an ordered stop
/// list. Fewer than two stops means zero distance and no legs; the status
/// partition is reported either way.
pub fn route_metrics(stops: &[Stop]) -> RouteMetrics {
    let completed_stops = stops
        .iter()
        .filter(|stop| stop.status == StopStatus::Completed)
        .count();
    let pending_stops = stops.len() - completed_stops;

    if stops.len() < 2 {
        return RouteMetrics {
            total_distance_km: 0.0,
            total_eta_minutes: 0.0,
            completed_stops,
            pending_stops,
            legs: Vec::new(),
        };
    }

    let mut total_distance_km = 0.0;
    let mut legs = Vec::with_capacity(stops.len() - 1);

    for pair in stops.windows(2) {
        let distance_km = haversine_distance_km(pair[0].coordinate, pair[1].coordinate);
        total_distance_km += distance_km;
        legs.push(RouteLeg {
            stop_id: pair[0].id.clone(),
            distance_km,
            eta_minutes: eta_minutes(distance_km, DEFAULT_AVERAGE_SPEED_KMH),
        });
    }

    RouteMetrics {
        total_distance_km,
        total_eta_minutes: legs.iter().map(|leg| leg.eta_minutes).sum(),
        completed_stops,
        pending_stops,
        legs,
    }
}

/// Reorders stops with a greedy nearest-neighbor pass.
///
/// The first stop is a pinned origin and never moves. From there the closest
/// unvisited stop is appended repeatedly; ties go to the earliest candidate in
/// list order (strict `<` under a linear scan), so the result is deterministic.
/// Two stops or fewer come back unchanged. This is a heuristic, not an optimal
/// tour.
pub fn optimize_order<T: Located + Clone>(stops: &[T]) -> Vec<T> {
    if stops.len() <= 2 {
        return stops.to_vec();
    }

    let mut remaining: Vec<T> = stops[1..].to_vec();
    let mut ordered = vec![stops[0].clone()];
    let mut current = stops[0].coordinate();

    while !remaining.is_empty() {
        let mut closest_index = 0;
        let mut shortest = f64::MAX;

        for (index, candidate) in remaining.iter().enumerate() {
            let distance = haversine_distance_km(current, candidate.coordinate());
            if distance < shortest {
                shortest = distance;
                closest_index = index;
            }
        }

        let next = remaining.remove(closest_index);
        current = next.coordinate();
        ordered.push(next);
    }

    ordered
}

/// A mutable, ordered stop sequence with derived metrics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutePlan {
    stops: Vec<Stop>,
    next_id: u64,
}

impl RoutePlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stops(stops: Vec<Stop>) -> Self {
        Self { stops, next_id: 0 }
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// Adds a stop by label. Known labels resolve to their suggested
    /// coordinates; anything else gets deterministic placeholder coordinates.
    /// Blank input is ignored.
    pub fn add_stop(&mut self, label: &str) -> Option<&Stop> {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return None;
        }

        let suggestion = locations::find_suggestion(trimmed);
        let (label, coordinate, notes) = match suggestion {
            Some(suggestion) => (
                suggestion.label.to_string(),
                suggestion.coordinate,
                suggestion.notes.map(str::to_string),
            ),
            None => (trimmed.to_string(), geo::coordinate_from_label(trimmed), None),
        };

        self.next_id += 1;
        self.stops.push(Stop {
            id: format!("stop-{}", self.next_id),
            label,
            coordinate,
            notes,
            status: StopStatus::Pending,
        });
        self.stops.last()
    }

    /// Appends a fully formed stop (caller-provided id).
    pub fn push_stop(&mut self, stop: Stop) {
        self.stops.push(stop);
    }

    /// Removes the stop with the given id; returns whether anything changed.
    pub fn remove_stop(&mut self, id: &str) -> bool {
        let before = self.stops.len();
        self.stops.retain(|stop| stop.id != id);
        self.stops.len() != before
    }

    /// Flips a stop between pending and completed.
    pub fn toggle_status(&mut self, id: &str) -> bool {
        let Some(stop) = self.stops.iter_mut().find(|stop| stop.id == id) else {
            return false;
        };
        stop.status = match stop.status {
            StopStatus::Pending => StopStatus::Completed,
            StopStatus::Completed => StopStatus::Pending,
        };
        true
    }

    /// Reorders the plan in place with the nearest-neighbor heuristic.
    pub fn optimize(&mut self) {
        self.stops = optimize_order(&self.stops);
    }

    pub fn metrics(&self) -> RouteMetrics {
        route_metrics(&self.stops)
    }

    /// Shareable plain-text summary: totals plus the numbered stop list.
    pub fn summary(&self) -> String {
        let metrics = self.metrics();
        let stop_lines = self
            .stops
            .iter()
            .enumerate()
            .map(|(index, stop)| format!("{}. {}", index + 1, stop.label))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "Route summary\nDistance: {}\nETA: {}\n\nStops:\n{}",
            geo::format_distance(metrics.total_distance_km),
            geo::format_eta(metrics.total_eta_minutes),
            stop_lines
        )
    }
}
