//! Rotation models

use crate::constants::J2000;
use nalgebra::{UnitQuaternion, Vector3};
use std::f64::consts::PI;
use std::fmt;

/// Orientation as a function of time
pub trait RotationModel: fmt::Debug {
    /// Orientation at the given Julian date
    fn orientation_at(&self, jd: f64) -> UnitQuaternion<f64>;

    /// Rotation period in days (zero when not rotating)
    fn period(&self) -> f64;

    fn is_periodic(&self) -> bool;
}

/// Orientation that never changes
#[derive(Clone, Debug, PartialEq)]
pub struct ConstantOrientation {
    orientation: UnitQuaternion<f64>,
}

impl ConstantOrientation {
    pub fn new(orientation: UnitQuaternion<f64>) -> Self {
        Self { orientation }
    }

    pub fn identity() -> Self {
        Self::new(UnitQuaternion::identity())
    }

    /// Fixed orientation given by an equator plane and a meridian angle
    pub fn from_angles(meridian_angle: f64, inclination: f64, ascending_node: f64) -> Self {
        Self::new(equator_orientation(ascending_node, inclination) * spin(meridian_angle))
    }
}

impl RotationModel for ConstantOrientation {
    fn orientation_at(&self, _jd: f64) -> UnitQuaternion<f64> {
        self.orientation
    }

    fn period(&self) -> f64 {
        0.0
    }

    fn is_periodic(&self) -> bool {
        false
    }
}

/// Constant-rate spin about a fixed axis
#[derive(Clone, Debug, PartialEq)]
pub struct UniformRotation {
    /// Rotation period (days)
    pub period: f64,
    /// Meridian angle at epoch (radians)
    pub offset: f64,
    /// Julian date at which the meridian angle equals `offset`
    pub epoch: f64,
    /// Tilt of the equator plane (radians)
    pub inclination: f64,
    /// Longitude of the equator's ascending node (radians)
    pub ascending_node: f64,
}

impl UniformRotation {
    pub fn new(period: f64, offset: f64, epoch: f64, inclination: f64, ascending_node: f64) -> Self {
        Self { period, offset, epoch, inclination, ascending_node }
    }

    /// Rotation synchronous with an orbit of the given period
    pub fn synchronous(period: f64) -> Self {
        Self::new(period, 0.0, J2000, 0.0, 0.0)
    }

    /// Meridian angle at the given date, in [0, 2π)
    pub fn spin_angle(&self, jd: f64) -> f64 {
        let turns = (jd - self.epoch) / self.period;
        (self.offset + 2.0 * PI * turns.fract()).rem_euclid(2.0 * PI)
    }
}

impl RotationModel for UniformRotation {
    fn orientation_at(&self, jd: f64) -> UnitQuaternion<f64> {
        equator_orientation(self.ascending_node, self.inclination) * spin(self.spin_angle(jd))
    }

    fn period(&self) -> f64 {
        self.period
    }

    fn is_periodic(&self) -> bool {
        true
    }
}

fn equator_orientation(ascending_node: f64, inclination: f64) -> UnitQuaternion<f64> {
    UnitQuaternion::from_axis_angle(&Vector3::z_axis(), ascending_node)
        * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), inclination)
}

fn spin(angle: f64) -> UnitQuaternion<f64> {
    UnitQuaternion::from_axis_angle(&Vector3::z_axis(), angle)
}
