//! Orbit providers
//!
//! An orbit is an immutable function of time returning a position in
//! kilometers relative to the center of its reference frame. Times are TDB
//! Julian dates, periods are in days.

use nalgebra::Vector3;
use std::fmt;

/// Position as a function of time
pub trait Orbit: fmt::Debug {
    /// Position (km) at the given Julian date
    fn position_at(&self, jd: f64) -> Vector3<f64>;

    /// Orbital period in days, also used to seed synchronous rotation
    fn period(&self) -> f64;

    /// Radius of a sphere centered on the frame origin that contains the orbit
    fn bounding_radius(&self) -> f64;

    /// Whether the orbit repeats with its period
    fn is_periodic(&self) -> bool {
        true
    }
}

/// A position that never changes
#[derive(Clone, Debug, PartialEq)]
pub struct FixedPosition {
    position: Vector3<f64>,
}

impl FixedPosition {
    pub fn new(position: Vector3<f64>) -> Self {
        Self { position }
    }
}

impl Orbit for FixedPosition {
    fn position_at(&self, _jd: f64) -> Vector3<f64> {
        self.position
    }

    /// Fixed positions report a one day period so synchronous rotation stays finite
    fn period(&self) -> f64 {
        1.0
    }

    fn bounding_radius(&self) -> f64 {
        self.position.norm() * 1.1
    }

    fn is_periodic(&self) -> bool {
        false
    }
}
