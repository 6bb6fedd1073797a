//! Great-circle distance and ETA helpers.
//!
//! Straight-line estimates only: good enough for planner summaries and stop
//! ordering, no road network involved.

use serde::{Deserialize, Serialize};

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Average driving speed assumption for ETA estimation.
pub const DEFAULT_AVERAGE_SPEED_KMH: f64 = 35.0;

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Haversine distance between two coordinates in kilometers.
pub fn haversine_distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + (d_lon / 2.0).sin().powi(2) * lat1.cos() * lat2.cos();

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Travel time in minutes for a leg at the given average speed.
pub fn eta_minutes(distance_km: f64, average_speed_kmh: f64) -> f64 {
    (distance_km / average_speed_kmh) * 60.0
}

/// "12.3 km"
pub fn format_distance(distance_km: f64) -> String {
    format!("{distance_km:.1} km")
}

/// "7 mins" under an hour, "3h 11m" above.
pub fn format_eta(minutes: f64) -> String {
    if minutes < 60.0 {
        return format!("{} mins", minutes.round() as i64);
    }

    let hrs = (minutes / 60.0).floor() as i64;
    let mins = (minutes % 60.0).round() as i64;
    format!("{hrs}h {mins}m")
}

/// Deterministic placeholder coordinates for a free-text label.
///
/// Not real geocoding: a character-weighted hash scattered around a fixed
/// base point, so unrecognized planner input still lands somewhere stable.
pub fn coordinate_from_label(label: &str) -> Coordinate {
    let base_lat = 37.7749;
    let base_lon = -122.4194;

    let hash: u64 = label
        .chars()
        .enumerate()
        .map(|(index, ch)| ch as u64 * (index as u64 + 1))
        .sum();

    // ±0.1 deg (~11km) lat, ±0.13 deg lon
    let lat_offset = ((hash % 200) as i64 - 100) as f64 / 1000.0;
    let lon_offset = ((hash % 260) as i64 - 130) as f64 / 1000.0;

    Coordinate::new(base_lat + lat_offset, base_lon + lon_offset)
}
