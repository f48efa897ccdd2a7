/// Astronomical unit in kilometers
pub const KM_PER_AU: f64 = 149_597_870.7;

/// Julian date of the J2000.0 epoch (2000-01-01T12:00:00 TDB)
pub const J2000: f64 = 2_451_545.0;

/// Days in a Julian year
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Hours in a day
pub const HOURS_PER_DAY: f64 = 24.0;
