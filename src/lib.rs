//! transit-planner core
//!
//! Live-transit progress smoothing and route-planning primitives. The crate
//! owns the math; polling, persistence scheduling, and display belong to the
//! caller.

pub mod geo;
pub mod locations;
pub mod plan;
pub mod progress;
pub mod registry;
pub mod timeline;
pub mod traits;
