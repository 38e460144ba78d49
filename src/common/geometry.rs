//! Barrel detector geometry
//!
//! Cylindrical layers centred on the beam axis (z). Used by the simulator to
//! place hits and by output rows to report transverse radii.

use nalgebra::Vector3;
use std::f64::consts::PI;

use crate::decay::DetectorId;

/// Number of azimuthal sectors per layer used to build detector ids
pub const PHI_SECTORS: u32 = 20;

/// One cylindrical barrel layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorLayer {
    /// Layer radius (cm)
    pub radius: f64,
    /// Half of the active length along z (cm)
    pub half_length: f64,
}

/// Inner tracker barrel, innermost layer first
pub const BARREL_LAYERS: [DetectorLayer; 8] = [
    DetectorLayer::new(1.8, 15.0),
    DetectorLayer::new(2.4, 15.0),
    DetectorLayer::new(3.0, 15.0),
    DetectorLayer::new(7.0, 15.0),
    DetectorLayer::new(19.605, 14.0),
    DetectorLayer::new(24.545, 14.0),
    DetectorLayer::new(34.368, 75.0),
    DetectorLayer::new(39.355, 75.0),
];

/// Distance of a point from the beam axis
#[inline]
pub fn transverse_radius(point: &Vector3<f64>) -> f64 {
    point.x.hypot(point.y)
}

/// Azimuthal angle of a point in [-pi, pi]
#[inline]
pub fn azimuth(point: &Vector3<f64>) -> f64 {
    point.y.atan2(point.x)
}

impl DetectorLayer {
    /// Create a layer
    pub const fn new(radius: f64, half_length: f64) -> Self {
        Self {
            radius,
            half_length,
        }
    }

    /// Where a straight track leaves this cylinder.
    ///
    /// Solves |(o + t d)_xy| = R for the outgoing root. Returns `None` when the
    /// track runs parallel to the axis, misses the cylinder, crosses it only
    /// behind the origin, or crosses it outside the active length.
    pub fn intersect(
        &self,
        origin: &Vector3<f64>,
        direction: &Vector3<f64>,
    ) -> Option<Vector3<f64>> {
        let a = direction.x * direction.x + direction.y * direction.y;
        if a <= f64::EPSILON {
            return None;
        }
        let b = 2.0 * (origin.x * direction.x + origin.y * direction.y);
        let c = origin.x * origin.x + origin.y * origin.y - self.radius * self.radius;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }

        let t = (-b + discriminant.sqrt()) / (2.0 * a);
        if t <= 0.0 {
            return None;
        }

        let point = origin + direction * t;
        (point.z.abs() <= self.half_length).then_some(point)
    }
}

/// Detector id of a hit on `layer`: layer * 100 + azimuthal sector
pub fn detector_id(layer: usize, point: &Vector3<f64>) -> DetectorId {
    let fraction = (azimuth(point) + PI) / (2.0 * PI);
    let sector = ((fraction * PHI_SECTORS as f64) as u32).min(PHI_SECTORS - 1);
    layer as DetectorId * 100 + sector
}
