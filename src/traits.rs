//! Core domain traits.
//!
//! Intentionally minimal: concrete apps implement these for their own stop
//! models so the distance-based algorithms stay generic.

use crate::geo::Coordinate;

/// Anything with a geographic position.
pub trait Located {
    fn coordinate(&self) -> Coordinate;
}

impl Located for Coordinate {
    fn coordinate(&self) -> Coordinate {
        *self
    }
}
