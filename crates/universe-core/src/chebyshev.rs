//! Chebyshev polynomial trajectories for spacecraft
//!
//! Used for tabulated ephemerides (e.g. JPL Horizons fits). Outside the
//! covered span the nearest segment is evaluated at its boundary.

use crate::orbit::Orbit;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// A single segment of Chebyshev coefficients valid for a time range
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChebyshevSegment {
    /// Start (Julian date)
    pub start: f64,
    /// End (Julian date)
    pub end: f64,
    /// Coefficients for X component (km)
    pub coeffs_x: Vec<f64>,
    /// Coefficients for Y component (km)
    pub coeffs_y: Vec<f64>,
    /// Coefficients for Z component (km)
    pub coeffs_z: Vec<f64>,
}

impl ChebyshevSegment {
    /// Check if this segment covers the given date
    pub fn contains(&self, jd: f64) -> bool {
        jd >= self.start && jd <= self.end
    }

    /// Evaluate position at given date
    pub fn position(&self, jd: f64) -> Vector3<f64> {
        // Map time to [-1, 1] domain
        let t_norm = (2.0 * (jd - self.start) / (self.end - self.start) - 1.0).clamp(-1.0, 1.0);

        Vector3::new(
            evaluate_chebyshev(&self.coeffs_x, t_norm),
            evaluate_chebyshev(&self.coeffs_y, t_norm),
            evaluate_chebyshev(&self.coeffs_z, t_norm),
        )
    }
}

/// Evaluates Chebyshev polynomial series at normalized time t using Clenshaw recurrence
/// t must be in [-1, 1]
fn evaluate_chebyshev(coeffs: &[f64], t: f64) -> f64 {
    let n = coeffs.len();
    if n == 0 {
        return 0.0;
    }
    if n == 1 {
        return coeffs[0];
    }

    // b_k = a_k + 2*x*b_{k+1} - b_{k+2}
    let mut b2 = 0.0;
    let mut b1 = 0.0;
    let x2 = 2.0 * t;

    for i in (1..n).rev() {
        let b0 = coeffs[i] + x2 * b1 - b2;
        b2 = b1;
        b1 = b0;
    }

    // f(x) = a_0 + x*b_1 - b_2
    coeffs[0] + t * b1 - b2
}

/// Trajectory made of contiguous Chebyshev segments, sorted by start time
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChebyshevOrbit {
    segments: Vec<ChebyshevSegment>,
    bounding_radius: f64,
}

impl ChebyshevOrbit {
    /// Build from segments; returns None when there are no usable segments
    pub fn new(mut segments: Vec<ChebyshevSegment>) -> Option<Self> {
        segments.retain(|s| s.end > s.start);
        if segments.is_empty() {
            return None;
        }
        segments.sort_by(|a, b| a.start.total_cmp(&b.start));

        // Coefficient magnitudes bound the polynomial on [-1, 1]
        let bound = |c: &[f64]| c.iter().map(|x| x.abs()).sum::<f64>();
        let bounding_radius = segments
            .iter()
            .map(|s| {
                Vector3::new(bound(&s.coeffs_x), bound(&s.coeffs_y), bound(&s.coeffs_z)).norm()
            })
            .fold(0.0, f64::max);

        Some(Self { segments, bounding_radius })
    }

    pub fn segments(&self) -> &[ChebyshevSegment] {
        &self.segments
    }

    pub fn start(&self) -> f64 {
        self.segments[0].start
    }

    pub fn end(&self) -> f64 {
        self.segments[self.segments.len() - 1].end
    }
}

impl Orbit for ChebyshevOrbit {
    fn position_at(&self, jd: f64) -> Vector3<f64> {
        let segment = self
            .segments
            .iter()
            .find(|s| s.contains(jd))
            .unwrap_or_else(|| {
                if jd < self.start() {
                    &self.segments[0]
                } else {
                    &self.segments[self.segments.len() - 1]
                }
            });
        segment.position(jd)
    }

    /// The covered time span
    fn period(&self) -> f64 {
        self.end() - self.start()
    }

    fn bounding_radius(&self) -> f64 {
        self.bounding_radius
    }

    fn is_periodic(&self) -> bool {
        false
    }
}
