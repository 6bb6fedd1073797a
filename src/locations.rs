//! Suggested planner locations.
//!
//! A small built-in catalog the planner offers while typing; lookups are
//! trimmed, case-insensitive substring matches.

use crate::geo::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationSuggestion {
    pub id: &'static str,
    pub label: &'static str,
    pub coordinate: Coordinate,
    pub notes: Option<&'static str>,
}

pub const SUGGESTED_LOCATIONS: [LocationSuggestion; 6] = [
    LocationSuggestion {
        id: "loc-warehouse",
        label: "Warehouse – 145 Market St",
        coordinate: Coordinate::new(37.7936, -122.3965),
        notes: Some("Load-out hub"),
    },
    LocationSuggestion {
        id: "loc-embarcadero",
        label: "Drop-off – 500 Embarcadero",
        coordinate: Coordinate::new(37.8011, -122.398),
        notes: None,
    },
    LocationSuggestion {
        id: "loc-union",
        label: "Drop-off – 2000 Union St",
        coordinate: Coordinate::new(37.7975, -122.4339),
        notes: None,
    },
    LocationSuggestion {
        id: "loc-mission",
        label: "Pickup – 24th & Mission",
        coordinate: Coordinate::new(37.7521, -122.4186),
        notes: None,
    },
    LocationSuggestion {
        id: "loc-downtown",
        label: "Drop-off – 1 Montgomery St",
        coordinate: Coordinate::new(37.7897, -122.4011),
        notes: None,
    },
    LocationSuggestion {
        id: "loc-coit",
        label: "Drop-off – Coit Tower Overlook",
        coordinate: Coordinate::new(37.8024, -122.4058),
        notes: None,
    },
];

/// First suggestion whose label contains the query, ignoring case and
/// surrounding whitespace.
pub fn find_suggestion(query: &str) -> Option<&'static LocationSuggestion> {
    let normalized = query.trim().to_lowercase();
    SUGGESTED_LOCATIONS
        .iter()
        .find(|location| location.label.to_lowercase().contains(&normalized))
}
