//! Shared components: detector geometry and synthetic event generation.

pub mod geometry;
pub mod simulation;

pub use geometry::{transverse_radius, DetectorLayer, BARREL_LAYERS};
pub use simulation::{simulate_events, SimulationConfig};
