//! Julian date conversions
//!
//! Catalog times are TDB Julian dates stored as plain `f64` so that phase
//! bounds can be `-inf` / `+inf`.

use crate::constants::{DAYS_PER_YEAR, J2000};
use hifitime::Epoch;
use std::str::FromStr;

/// Convert hifitime Epoch to a TDB Julian date
pub fn epoch_to_jd(epoch: Epoch) -> f64 {
    epoch.to_jde_tdb_days()
}

/// Convert a TDB Julian date to hifitime Epoch
///
/// Infinite dates have no Epoch representation and return None.
pub fn jd_to_epoch(jd: f64) -> Option<Epoch> {
    jd.is_finite().then(|| Epoch::from_jde_tdb(jd))
}

/// Parse a date string ("2000-01-01T12:00:00 UTC", "2010-06-01T00:00:00 TDB")
/// into a TDB Julian date
pub fn parse_epoch(text: &str) -> Option<f64> {
    Epoch::from_str(text.trim()).ok().map(epoch_to_jd)
}

/// Julian years elapsed since J2000
pub fn years_since_j2000(jd: f64) -> f64 {
    (jd - J2000) / DAYS_PER_YEAR
}

/// Format a Julian date for display, keeping the infinite bounds readable
pub fn format_jd(jd: f64) -> String {
    if jd == f64::NEG_INFINITY {
        "-inf".to_string()
    } else if jd == f64::INFINITY {
        "+inf".to_string()
    } else {
        match jd_to_epoch(jd) {
            Some(epoch) => format!("{} (JD {:.5})", epoch, jd),
            None => format!("JD {}", jd),
        }
    }
}
