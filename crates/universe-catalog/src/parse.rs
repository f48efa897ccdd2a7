//! Catalog field parsing: dates, orbits, rotation models and reference frames

use crate::error::{CatalogError, CatalogResult};
use crate::frame::{Axis, FrameAxis, FrameKind, FrameVector, ReferenceFrame, StaticPlane};
use crate::universe::{Selection, Universe};
use crate::value::{Hash, Value};
use std::path::Path;
use std::rc::Rc;
use tracing::warn;
use universe_core::constants::{DAYS_PER_YEAR, HOURS_PER_DAY, J2000, KM_PER_AU};
use universe_core::{
    parse_epoch, ChebyshevOrbit, ChebyshevSegment, ConstantOrientation, EllipticalOrbit,
    FixedPosition, Orbit, RotationModel, UniformRotation,
};

const ROTATION_KEYS: [&str; 7] = [
    "UniformRotation",
    "FixedRotation",
    "RotationPeriod",
    "RotationOffset",
    "RotationEpoch",
    "Obliquity",
    "EquatorAscendingNode",
];

/// Read a date field as a TDB Julian date
///
/// Numbers are Julian dates; strings are calendar dates. A value that is
/// present but unusable is logged and treated as absent.
pub fn parse_date(hash: &Hash, key: &str) -> Option<f64> {
    match hash.get_value(key)? {
        Value::Number(jd) => Some(*jd),
        Value::String(text) => {
            let jd = parse_epoch(text);
            if jd.is_none() {
                warn!("Invalid date '{}' for {}", text, key);
            }
            jd
        }
        other => {
            warn!("{} must be a number or date string, found {}", key, other.type_name());
            None
        }
    }
}

/// Build the orbit described by a field group
///
/// With `use_planet_units` distances are AU and periods years, otherwise
/// kilometers and days. `path` is the directory relative trajectory files
/// are read from.
pub fn create_orbit(hash: &Hash, path: &Path, use_planet_units: bool) -> CatalogResult<Option<Rc<dyn Orbit>>> {
    if let Some(value) = hash.get_value("EllipticalOrbit") {
        let elements = value
            .as_hash()
            .ok_or_else(|| invalid_orbit("EllipticalOrbit must be a property group"))?;
        return Ok(Some(Rc::new(create_elliptical_orbit(elements, use_planet_units)?)));
    }

    if let Some(value) = hash.get_value("FixedPosition") {
        let position = value
            .as_vector()
            .ok_or_else(|| invalid_orbit("FixedPosition must be a three element vector"))?;
        let scale = if use_planet_units { KM_PER_AU } else { 1.0 };
        return Ok(Some(Rc::new(FixedPosition::new(position * scale))));
    }

    if let Some(value) = hash.get_value("ChebyshevTrajectory") {
        let trajectory = value
            .as_hash()
            .ok_or_else(|| invalid_orbit("ChebyshevTrajectory must be a property group"))?;
        return Ok(Some(Rc::new(create_chebyshev_orbit(trajectory, path)?)));
    }

    Ok(None)
}

fn invalid_orbit(message: impl Into<String>) -> CatalogError {
    CatalogError::InvalidOrbit(message.into())
}

fn create_elliptical_orbit(elements: &Hash, use_planet_units: bool) -> CatalogResult<EllipticalOrbit> {
    let (distance_scale, period_scale) = if use_planet_units {
        (KM_PER_AU, DAYS_PER_YEAR)
    } else {
        (1.0, 1.0)
    };

    let period = elements
        .get_number("Period")
        .ok_or_else(|| invalid_orbit("Period must be specified in EllipticalOrbit"))?
        * period_scale;
    if !(period > 0.0) {
        return Err(invalid_orbit(format!("period must be positive, got {}", period)));
    }

    let eccentricity = elements.get_number("Eccentricity").unwrap_or(0.0);
    if !(0.0..1.0).contains(&eccentricity) {
        return Err(invalid_orbit(format!("eccentricity {} is not in [0, 1)", eccentricity)));
    }

    let semi_major_axis = match (elements.get_number("SemiMajorAxis"), elements.get_number("PericenterDistance")) {
        (Some(a), _) => a,
        (None, Some(q)) => q / (1.0 - eccentricity),
        (None, None) => {
            return Err(invalid_orbit("SemiMajorAxis or PericenterDistance required"));
        }
    } * distance_scale;
    if !(semi_major_axis > 0.0) {
        return Err(invalid_orbit("semi-major axis must be positive"));
    }

    let inclination = elements.get_angle("Inclination").unwrap_or(0.0);
    let ascending_node = elements.get_angle("AscendingNode").unwrap_or(0.0);

    let arg_of_pericenter = match elements.get_angle("LongOfPericenter") {
        Some(long_of_pericenter) => long_of_pericenter - ascending_node,
        None => elements.get_angle("ArgOfPericenter").unwrap_or(0.0),
    };

    let mean_anomaly = match elements.get_angle("MeanLongitude") {
        Some(mean_longitude) => mean_longitude - arg_of_pericenter - ascending_node,
        None => elements.get_angle("MeanAnomaly").unwrap_or(0.0),
    };

    let epoch = parse_date(elements, "Epoch").unwrap_or(J2000);

    Ok(EllipticalOrbit::new(
        semi_major_axis,
        eccentricity,
        inclination,
        ascending_node,
        arg_of_pericenter,
        mean_anomaly,
        epoch,
        period,
    ))
}

fn create_chebyshev_orbit(trajectory: &Hash, path: &Path) -> CatalogResult<ChebyshevOrbit> {
    let segments = match (trajectory.get_value("Segments"), trajectory.get_string("Source")) {
        (Some(value), _) => {
            let items = value
                .as_array()
                .ok_or_else(|| invalid_orbit("Segments must be an array"))?;
            items
                .iter()
                .enumerate()
                .map(|(i, item)| parse_segment(item, i + 1))
                .collect::<CatalogResult<Vec<_>>>()?
        }
        (None, Some(source)) => {
            let contents = std::fs::read_to_string(path.join(source))?;
            serde_json::from_str::<Vec<ChebyshevSegment>>(&contents)?
        }
        (None, None) => return Err(invalid_orbit("ChebyshevTrajectory needs Segments or Source")),
    };

    if let Some(bad) = segments.iter().find(|s| !(s.start < s.end)) {
        return Err(invalid_orbit(format!("segment starts at {} but ends at {}", bad.start, bad.end)));
    }

    ChebyshevOrbit::new(segments).ok_or_else(|| invalid_orbit("ChebyshevTrajectory has no segments"))
}

fn parse_segment(item: &Value, index: usize) -> CatalogResult<ChebyshevSegment> {
    let segment = item
        .as_hash()
        .ok_or_else(|| invalid_orbit(format!("segment {} is not a property group", index)))?;
    let field = |key: &str| {
        segment
            .get_value(key)
            .and_then(Value::as_numbers)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| invalid_orbit(format!("segment {} has no {} coefficients", index, key)))
    };

    Ok(ChebyshevSegment {
        start: parse_date(segment, "Start")
            .ok_or_else(|| invalid_orbit(format!("segment {} has no Start", index)))?,
        end: parse_date(segment, "End")
            .ok_or_else(|| invalid_orbit(format!("segment {} has no End", index)))?,
        coeffs_x: field("X")?,
        coeffs_y: field("Y")?,
        coeffs_z: field("Z")?,
    })
}

/// True if the field group names any rotation model field
pub fn has_rotation_fields(hash: &Hash) -> bool {
    ROTATION_KEYS.iter().any(|key| hash.contains(key))
}

/// Build the rotation model described by a field group
///
/// Legacy rotation fields default their period to `sync_period` (days).
pub fn create_rotation_model(hash: &Hash, sync_period: f64) -> CatalogResult<Option<Rc<dyn RotationModel>>> {
    if let Some(value) = hash.get_value("UniformRotation") {
        let params = value
            .as_hash()
            .ok_or_else(|| invalid_rotation("UniformRotation must be a property group"))?;
        let period = rotation_period(params, "Period", sync_period)?;
        return Ok(Some(Rc::new(UniformRotation::new(
            period,
            params.get_angle("MeridianAngle").unwrap_or(0.0),
            parse_date(params, "Epoch").unwrap_or(J2000),
            params.get_angle("Inclination").unwrap_or(0.0),
            params.get_angle("AscendingNode").unwrap_or(0.0),
        ))));
    }

    if let Some(value) = hash.get_value("FixedRotation") {
        let params = value
            .as_hash()
            .ok_or_else(|| invalid_rotation("FixedRotation must be a property group"))?;
        return Ok(Some(Rc::new(ConstantOrientation::from_angles(
            params.get_angle("MeridianAngle").unwrap_or(0.0),
            params.get_angle("Inclination").unwrap_or(0.0),
            params.get_angle("AscendingNode").unwrap_or(0.0),
        ))));
    }

    if ROTATION_KEYS[2..].iter().any(|key| hash.contains(key)) {
        let period = rotation_period(hash, "RotationPeriod", sync_period)?;
        return Ok(Some(Rc::new(UniformRotation::new(
            period,
            hash.get_angle("RotationOffset").unwrap_or(0.0),
            parse_date(hash, "RotationEpoch").unwrap_or(J2000),
            hash.get_angle("Obliquity").unwrap_or(0.0),
            hash.get_angle("EquatorAscendingNode").unwrap_or(0.0),
        ))));
    }

    Ok(None)
}

fn invalid_rotation(message: impl Into<String>) -> CatalogError {
    CatalogError::InvalidRotation(message.into())
}

/// Period field in hours, converted to days
fn rotation_period(hash: &Hash, key: &str, sync_period: f64) -> CatalogResult<f64> {
    let period = match hash.get_value(key) {
        None => sync_period,
        Some(value) => {
            value
                .as_number()
                .ok_or_else(|| invalid_rotation(format!("{} must be a number", key)))?
                / HOURS_PER_DAY
        }
    };
    if !(period > 0.0) || !period.is_finite() {
        return Err(invalid_rotation(format!("rotation period must be positive, got {}", period)));
    }
    Ok(period)
}

/// Uniform rotation synchronous with an orbit of the given period (days)
pub fn create_default_rotation_model(period: f64) -> Rc<dyn RotationModel> {
    Rc::new(UniformRotation::synchronous(period))
}

/// Build a reference frame from a definition like `{ "EclipticJ2000": { "Center": "Sol/Earth" } }`
pub fn create_reference_frame(universe: &Universe, value: &Value) -> CatalogResult<Rc<ReferenceFrame>> {
    let definition = value
        .as_hash()
        .ok_or_else(|| invalid_frame("frame definition must be a property group"))?;
    if definition.len() != 1 {
        return Err(invalid_frame("frame definition must name exactly one frame type"));
    }
    let Some((name, params)) = definition.iter().next() else {
        return Err(invalid_frame("empty frame definition"));
    };
    let params = params
        .as_hash()
        .ok_or_else(|| invalid_frame(format!("{} must be a property group", name)))?;

    let center = resolve(universe, params, "Center")?
        .ok_or_else(|| invalid_frame(format!("Center is required for {} frame", name)))?;

    let kind = match name {
        "EclipticJ2000" => FrameKind::Static(StaticPlane::Ecliptic),
        "EquatorJ2000" => FrameKind::Static(StaticPlane::Equator),
        "BodyFixed" => FrameKind::BodyFixed,
        "MeanEquator" => FrameKind::MeanEquator {
            object: resolve(universe, params, "Object")?.unwrap_or(center),
            freeze_epoch: parse_date(params, "Freeze"),
        },
        "OrbitSynchronized" => FrameKind::OrbitSynchronized {
            target: resolve(universe, params, "Target")?
                .ok_or_else(|| invalid_frame("Target is required for OrbitSynchronized frame"))?,
        },
        "TwoVector" => {
            let primary = create_frame_axis(universe, params, "Primary", center)?;
            let secondary = create_frame_axis(universe, params, "Secondary", center)?;
            if primary.axis.index() == secondary.axis.index() {
                return Err(invalid_frame("primary and secondary axes must be orthogonal"));
            }
            FrameKind::TwoVector { primary, secondary }
        }
        other => return Err(invalid_frame(format!("unknown frame type {}", other))),
    };

    Ok(Rc::new(ReferenceFrame::new(center, kind)))
}

fn invalid_frame(message: impl Into<String>) -> CatalogError {
    CatalogError::InvalidFrame(message.into())
}

/// Resolve an object path field; absent is `None`, unknown is an error
fn resolve(universe: &Universe, params: &Hash, key: &str) -> CatalogResult<Option<Selection>> {
    let Some(value) = params.get_value(key) else {
        return Ok(None);
    };
    let path = value
        .as_str()
        .ok_or_else(|| invalid_frame(format!("{} must be an object name", key)))?;
    universe
        .find_path(path)
        .map(Some)
        .ok_or_else(|| CatalogError::UnknownObject(path.to_string()))
}

fn create_frame_axis(universe: &Universe, params: &Hash, key: &str, center: Selection) -> CatalogResult<FrameAxis> {
    let def = params
        .get_hash(key)
        .ok_or_else(|| invalid_frame(format!("{} axis definition missing", key)))?;
    let axis = def
        .get_string("Axis")
        .and_then(Axis::parse)
        .ok_or_else(|| invalid_frame(format!("{} axis must be one of x, y, z, -x, -y, -z", key)))?;

    let vector = if let Some(rel) = def.get_hash("RelativePosition") {
        let (observer, target) = observer_and_target(universe, rel, center)?;
        FrameVector::RelativePosition { observer, target }
    } else if let Some(rel) = def.get_hash("RelativeVelocity") {
        let (observer, target) = observer_and_target(universe, rel, center)?;
        FrameVector::RelativeVelocity { observer, target }
    } else if let Some(constant) = def.get_hash("ConstantVector") {
        let direction = constant
            .get_vector("Vector")
            .filter(|v| v.norm() > 0.0)
            .ok_or_else(|| invalid_frame("ConstantVector needs a non-zero Vector"))?;
        let frame = constant
            .get_value("Frame")
            .map(|f| create_reference_frame(universe, f))
            .transpose()?;
        FrameVector::Constant { direction: direction.normalize(), frame }
    } else {
        return Err(invalid_frame(format!("{} axis has no direction vector", key)));
    };

    Ok(FrameAxis { axis, vector })
}

fn observer_and_target(universe: &Universe, rel: &Hash, center: Selection) -> CatalogResult<(Selection, Selection)> {
    let observer = resolve(universe, rel, "Observer")?.unwrap_or(center);
    let target = resolve(universe, rel, "Target")?
        .ok_or_else(|| invalid_frame("Target is required for a relative vector"))?;
    Ok((observer, target))
}
