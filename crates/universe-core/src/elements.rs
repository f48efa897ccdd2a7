//! Keplerian elliptical orbits

use crate::orbit::Orbit;
use nalgebra::{Matrix3, Vector3};
use std::f64::consts::PI;

/// Elliptical orbit described by classical Keplerian elements
///
/// Distances are kilometers, angles radians, times TDB Julian dates and the
/// period is in days.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EllipticalOrbit {
    /// Semi-major axis (km)
    pub a: f64,
    /// Eccentricity, in [0, 1)
    pub e: f64,
    /// Inclination (radians)
    pub i: f64,
    /// Longitude of ascending node (radians)
    pub omega_big: f64,
    /// Argument of pericenter (radians)
    pub omega_small: f64,
    /// Mean anomaly at epoch (radians)
    pub m0: f64,
    /// Reference epoch (Julian date)
    pub epoch: f64,
    /// Orbital period (days)
    pub period: f64,
}

impl EllipticalOrbit {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        a: f64, e: f64, i: f64,
        omega_big: f64, omega_small: f64,
        m0: f64, epoch: f64, period: f64,
    ) -> Self {
        Self { a, e, i, omega_big, omega_small, m0, epoch, period }
    }

    /// Mean motion (radians per day)
    pub fn mean_motion(&self) -> f64 {
        2.0 * PI / self.period
    }

    /// Mean anomaly at the given Julian date
    pub fn mean_anomaly_at(&self, jd: f64) -> f64 {
        normalize_angle(self.m0 + self.mean_motion() * (jd - self.epoch))
    }

    /// Solve Kepler's equation: M = E - e*sin(E)
    /// Returns eccentric anomaly E
    pub fn eccentric_anomaly(&self, mean_anomaly: f64) -> f64 {
        let m = normalize_angle(mean_anomaly);
        let e = self.e;

        // Newton-Raphson iteration
        let mut ea = if e < 0.8 { m } else { PI };

        for _ in 0..50 {
            let f = ea - e * ea.sin() - m;
            let fp = 1.0 - e * ea.cos();
            let delta = f / fp;
            ea -= delta;

            if delta.abs() < 1e-12 {
                break;
            }
        }

        ea
    }

    /// True anomaly from eccentric anomaly
    pub fn true_anomaly(&self, eccentric_anomaly: f64) -> f64 {
        let e = self.e;

        // tan(ν/2) = sqrt((1+e)/(1-e)) * tan(E/2)
        let half_nu = ((1.0 + e) / (1.0 - e)).sqrt() * (eccentric_anomaly / 2.0).tan();
        2.0 * half_nu.atan()
    }

    /// Distance from focus at given true anomaly
    pub fn radius(&self, true_anomaly: f64) -> f64 {
        self.a * (1.0 - self.e.powi(2)) / (1.0 + self.e * true_anomaly.cos())
    }

    /// Rotation matrix from perifocal to reference plane: R_z(Ω) * R_x(i) * R_z(ω)
    pub fn perifocal_to_reference(&self) -> Matrix3<f64> {
        let cos_o = self.omega_big.cos();
        let sin_o = self.omega_big.sin();
        let cos_i = self.i.cos();
        let sin_i = self.i.sin();
        let cos_w = self.omega_small.cos();
        let sin_w = self.omega_small.sin();

        Matrix3::new(
            cos_o * cos_w - sin_o * sin_w * cos_i,
            -cos_o * sin_w - sin_o * cos_w * cos_i,
            sin_o * sin_i,

            sin_o * cos_w + cos_o * sin_w * cos_i,
            -sin_o * sin_w + cos_o * cos_w * cos_i,
            -cos_o * sin_i,

            sin_w * sin_i,
            cos_w * sin_i,
            cos_i,
        )
    }
}

impl Orbit for EllipticalOrbit {
    fn position_at(&self, jd: f64) -> Vector3<f64> {
        let ea = self.eccentric_anomaly(self.mean_anomaly_at(jd));
        let nu = self.true_anomaly(ea);
        let r = self.radius(nu);

        let pf = Vector3::new(r * nu.cos(), r * nu.sin(), 0.0);
        self.perifocal_to_reference() * pf
    }

    fn period(&self) -> f64 {
        self.period
    }

    fn bounding_radius(&self) -> f64 {
        // Apocenter distance
        self.a * (1.0 + self.e)
    }
}

/// Normalize angle to [0, 2π)
fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle % (2.0 * PI);
    if a < 0.0 { a += 2.0 * PI; }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kepler_circular() {
        // Circular orbit: e=0 means E=M=ν
        let orbit = EllipticalOrbit::new(1.496e8, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 365.25);

        let m = PI / 4.0;
        let ea = orbit.eccentric_anomaly(m);
        let nu = orbit.true_anomaly(ea);

        assert!((ea - m).abs() < 1e-10);
        assert!((nu - m).abs() < 1e-10);
    }

    #[test]
    fn test_kepler_eccentric() {
        let orbit = EllipticalOrbit::new(1.496e8, 0.0167, 0.0, 0.0, 0.0, 0.0, 0.0, 365.25);

        // At pericenter (M=0), E=0, ν=0
        let ea = orbit.eccentric_anomaly(0.0);
        assert!(ea.abs() < 1e-10);

        // At apocenter (M=π), E=π, ν=π
        let ea = orbit.eccentric_anomaly(PI);
        assert!((ea - PI).abs() < 1e-10);
    }

    #[test]
    fn test_position_repeats_after_period() {
        let orbit = EllipticalOrbit::new(
            384_400.0, 0.0549, 0.09, 2.18, 5.55, 2.36, 2_451_545.0, 27.321661,
        );

        let p0 = orbit.position_at(2_451_600.0);
        let p1 = orbit.position_at(2_451_600.0 + orbit.period());
        assert!((p0 - p1).norm() < 1e-3, "drift {}", (p0 - p1).norm());

        let r = p0.norm();
        assert!(r >= orbit.a * (1.0 - orbit.e) - 1e-6);
        assert!(r <= orbit.bounding_radius() + 1e-6);
    }

    #[test]
    fn test_circular_radius_constant() {
        let orbit = EllipticalOrbit::new(1000.0, 0.0, 0.3, 0.2, 0.1, 0.0, 0.0, 10.0);
        for step in 0..10 {
            let r = orbit.position_at(step as f64 * 0.7).norm();
            assert!((r - 1000.0).abs() < 1e-9);
        }
    }
}
