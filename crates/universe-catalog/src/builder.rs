//! Timeline construction from catalog fields
//!
//! Builds either an explicit multi-phase timeline (`Timeline` key) or a
//! single-phase timeline from top-level orbit, frame and rotation fields.
//! Nothing here touches the body being built; the caller decides whether and
//! when the result is installed.

use crate::error::{CatalogError, CatalogResult};
use crate::frame::{FrameLookup, FrameRole, ReferenceFrame};
use crate::loader::Disposition;
use crate::parse::{
    create_default_rotation_model, create_orbit, create_reference_frame, create_rotation_model,
    has_rotation_fields, parse_date,
};
use crate::phase::TimelinePhase;
use crate::timeline::Timeline;
use crate::universe::{BodyId, Selection, StarId, SystemId, Universe};
use crate::value::{Hash, Value};
use std::path::Path;
use std::rc::Rc;
use tracing::{debug, warn};
use universe_core::{ConstantOrientation, Orbit, RotationModel};

/// Frames newly supplied by a catalog entry, with the role each plays
pub type NewFrames = Vec<(Rc<ReferenceFrame>, FrameRole)>;

/// Result of applying an entry's fields to a body's timeline
#[derive(Debug)]
pub enum TimelineChange {
    /// No timeline field was given for a Modify; keep the current timeline
    Unchanged,
    Replace { timeline: Timeline, new_frames: NewFrames },
}

/// Fields overriding a single timeline phase; `None` inherits
#[derive(Clone, Debug, Default)]
pub struct PhaseUpdate {
    pub orbit_frame: Option<Rc<ReferenceFrame>>,
    pub body_frame: Option<Rc<ReferenceFrame>>,
    pub orbit: Option<Rc<dyn Orbit>>,
    pub rotation_model: Option<Rc<dyn RotationModel>>,
    pub start: Option<f64>,
    pub end: Option<f64>,
}

impl PhaseUpdate {
    /// True if no field overrides the base phase
    pub fn is_empty(&self) -> bool {
        self.orbit_frame.is_none()
            && self.body_frame.is_none()
            && self.orbit.is_none()
            && self.rotation_model.is_none()
            && self.start.is_none()
            && self.end.is_none()
    }

    /// Frames this update supplies explicitly
    pub fn new_frames(&self) -> NewFrames {
        let mut frames = NewFrames::new();
        if let Some(frame) = &self.orbit_frame {
            frames.push((frame.clone(), FrameRole::Orbit));
        }
        if let Some(frame) = &self.body_frame {
            frames.push((frame.clone(), FrameRole::Body));
        }
        frames
    }

    /// Combine with a base phase into a new phase; the base is left as is
    ///
    /// Fields missing from both fall back to the default frame, an unbounded
    /// time range and a rotation synchronous with the orbit.
    pub fn merge(
        self,
        owner: BodyId,
        base: Option<&TimelinePhase>,
        default_frame: &Rc<ReferenceFrame>,
    ) -> CatalogResult<TimelinePhase> {
        let orbit = self
            .orbit
            .or_else(|| base.map(|p| p.orbit().clone()))
            .ok_or(CatalogError::MissingOrbit)?;
        let rotation_model = self
            .rotation_model
            .or_else(|| base.map(|p| p.rotation_model().clone()))
            .unwrap_or_else(|| create_default_rotation_model(orbit.period()));
        let orbit_frame = self
            .orbit_frame
            .or_else(|| base.map(|p| p.orbit_frame().clone()))
            .unwrap_or_else(|| default_frame.clone());
        let body_frame = self
            .body_frame
            .or_else(|| base.map(|p| p.body_frame().clone()))
            .unwrap_or_else(|| default_frame.clone());
        let start = self.start.or(base.map(TimelinePhase::start_time)).unwrap_or(f64::NEG_INFINITY);
        let end = self.end.or(base.map(TimelinePhase::end_time)).unwrap_or(f64::INFINITY);

        if !(start < end) {
            return Err(CatalogError::InvalidTimeRange { start, end });
        }

        Ok(TimelinePhase::new(owner, start, end, orbit_frame, orbit, body_frame, rotation_model))
    }
}

/// Body or star the bodies of a planetary system orbit by default
///
/// The system's primary body if it has one, otherwise its star. Returns
/// `None` when the primary belongs to a different star system.
pub fn orbit_barycenter(universe: &Universe, system: SystemId) -> Option<Selection> {
    let system = universe.system(system)?;
    let Some(primary) = system.primary() else {
        return Some(Selection::Star(system.star()));
    };

    let barycenter = Selection::Body(primary);
    if universe.star_of(barycenter) != Some(system.star()) {
        warn!(
            "OrbitBarycenter {} is not in the same star system",
            universe.path_of(barycenter)
        );
        return None;
    }
    Some(barycenter)
}

/// Fail if any frame is nested deeper than `max_depth`
pub fn check_frames(lookup: &dyn FrameLookup, frames: &[(Rc<ReferenceFrame>, FrameRole)], max_depth: u32) -> CatalogResult<()> {
    for (frame, role) in frames {
        let depth = frame.nesting_depth(lookup, max_depth, role.frame_type());
        if depth > max_depth {
            return Err(CatalogError::CircularFrame { role: *role });
        }
        debug!("{} frame nesting depth {}", role, depth);
    }
    Ok(())
}

/// Build the timeline an entry describes for body `owner` in `system`
///
/// `owner` may not exist yet (Add). For Modify the body's current timeline
/// supplies inherited fields when it has a single phase.
pub fn create_timeline(
    universe: &mut Universe,
    owner: BodyId,
    system: SystemId,
    data: &Hash,
    path: &Path,
    disposition: Disposition,
) -> CatalogResult<TimelineChange> {
    let barycenter = orbit_barycenter(universe, system).ok_or(CatalogError::BarycenterOutsideSystem)?;
    let default_frame = universe
        .default_frame(barycenter)
        .ok_or(CatalogError::BarycenterOutsideSystem)?;
    let system_star = universe
        .system(system)
        .map(|s| s.star())
        .ok_or(CatalogError::BarycenterOutsideSystem)?;
    let universe: &Universe = universe;

    if let Some(value) = data.get_value("Timeline") {
        let items = value.as_array().ok_or(CatalogError::TimelineNotArray)?;
        let (timeline, new_frames) =
            create_timeline_from_array(universe, owner, system_star, items, path, &default_frame)?;
        return Ok(TimelineChange::Replace { timeline, new_frames });
    }

    create_single_phase_timeline(universe, owner, system_star, data, path, disposition, &default_frame)
}

/// Resolve a frame field and check that every object it names is in the right star system
fn read_frame(
    universe: &Universe,
    data: &Hash,
    role: FrameRole,
    system_star: StarId,
) -> CatalogResult<Option<Rc<ReferenceFrame>>> {
    let key = match role {
        FrameRole::Orbit => "OrbitFrame",
        FrameRole::Body => "BodyFrame",
    };
    let Some(value) = data.get_value(key) else {
        return Ok(None);
    };

    let frame = create_reference_frame(universe, value)?;
    let outside = frame
        .referenced_objects()
        .into_iter()
        .any(|object| universe.star_of(object) != Some(system_star));
    if outside {
        return Err(CatalogError::FrameOutsideSystem { role });
    }
    Ok(Some(frame))
}

/// Orbits around a star are given in AU and years
fn uses_planet_units(frame: &ReferenceFrame) -> bool {
    frame.center().is_star()
}

fn create_timeline_from_array(
    universe: &Universe,
    owner: BodyId,
    system_star: StarId,
    items: &[Value],
    path: &Path,
    default_frame: &Rc<ReferenceFrame>,
) -> CatalogResult<(Timeline, NewFrames)> {
    if items.is_empty() {
        return Err(CatalogError::EmptyTimeline);
    }

    let mut timeline = Timeline::new();
    let mut new_frames = NewFrames::new();
    let mut previous_end = f64::NEG_INFINITY;

    for (i, item) in items.iter().enumerate() {
        let data = item.as_hash().ok_or(CatalogError::PhaseNotGroup(i + 1))?;
        let position = PhasePosition {
            is_first: i == 0,
            is_last: i + 1 == items.len(),
            previous_end,
        };

        let (phase, frames) =
            create_timeline_phase(universe, owner, system_star, data, path, default_frame, position)
                .map_err(|e| e.in_phase(i + 1))?;

        previous_end = phase.end_time();
        timeline.append_phase(phase).map_err(|e| e.in_phase(i + 1))?;
        new_frames.extend(frames);
    }

    Ok((timeline, new_frames))
}

#[derive(Clone, Copy)]
struct PhasePosition {
    is_first: bool,
    is_last: bool,
    previous_end: f64,
}

fn create_timeline_phase(
    universe: &Universe,
    owner: BodyId,
    system_star: StarId,
    data: &Hash,
    path: &Path,
    default_frame: &Rc<ReferenceFrame>,
    position: PhasePosition,
) -> CatalogResult<(TimelinePhase, NewFrames)> {
    let beginning = parse_date(data, "Beginning");
    if beginning.is_some() && !position.is_first {
        return Err(CatalogError::BeginningNotAllowed);
    }

    let ending = parse_date(data, "Ending");
    if ending.is_none() && !position.is_last {
        return Err(CatalogError::EndingRequired);
    }

    let start = beginning.unwrap_or(position.previous_end);
    let end = ending.unwrap_or(f64::INFINITY);
    if !(start < end) {
        return Err(CatalogError::InvalidTimeRange { start, end });
    }

    let orbit_frame = read_frame(universe, data, FrameRole::Orbit, system_star)?;
    let body_frame = read_frame(universe, data, FrameRole::Body, system_star)?;
    let mut new_frames = NewFrames::new();
    if let Some(frame) = &orbit_frame {
        new_frames.push((frame.clone(), FrameRole::Orbit));
    }
    if let Some(frame) = &body_frame {
        new_frames.push((frame.clone(), FrameRole::Body));
    }
    let orbit_frame = orbit_frame.unwrap_or_else(|| default_frame.clone());
    let body_frame = body_frame.unwrap_or_else(|| default_frame.clone());

    let orbit = create_orbit(data, path, uses_planet_units(&orbit_frame))?
        .ok_or(CatalogError::MissingOrbit)?;

    let rotation_model = match create_rotation_model(data, orbit.period()) {
        Ok(Some(model)) => model,
        Ok(None) => Rc::new(ConstantOrientation::identity()),
        Err(e) => {
            warn!("{}; using fixed orientation", e);
            Rc::new(ConstantOrientation::identity())
        }
    };

    let phase = TimelinePhase::new(owner, start, end, orbit_frame, orbit, body_frame, rotation_model);
    Ok((phase, new_frames))
}

fn create_single_phase_timeline(
    universe: &Universe,
    owner: BodyId,
    system_star: StarId,
    data: &Hash,
    path: &Path,
    disposition: Disposition,
    default_frame: &Rc<ReferenceFrame>,
) -> CatalogResult<TimelineChange> {
    let modify = disposition == Disposition::Modify;

    // Only a single-phase timeline can be patched field by field
    let base = if modify {
        universe
            .body(owner)
            .map(|b| b.timeline())
            .filter(|t| t.phase_count() == 1)
            .and_then(|t| t.phase(0))
            .cloned()
    } else {
        None
    };

    let orbit_frame = read_frame(universe, data, FrameRole::Orbit, system_star)?;
    let body_frame = read_frame(universe, data, FrameRole::Body, system_star)?;

    let effective_orbit_frame = orbit_frame
        .as_ref()
        .or(base.as_ref().map(|p| p.orbit_frame()))
        .unwrap_or(default_frame);
    let orbit = create_orbit(data, path, uses_planet_units(effective_orbit_frame))?;

    let sync_period = orbit
        .as_ref()
        .or(base.as_ref().map(|p| p.orbit()))
        .map(|o| o.period());
    let rotation_model = match sync_period {
        Some(period) => create_rotation_model(data, period).unwrap_or_else(|e| {
            warn!("{}; keeping default rotation", e);
            None
        }),
        None if has_rotation_fields(data) => return Err(CatalogError::MissingOrbit),
        None => None,
    };

    let update = PhaseUpdate {
        orbit_frame,
        body_frame,
        orbit,
        rotation_model,
        start: parse_date(data, "Beginning"),
        end: parse_date(data, "Ending"),
    };

    if modify && update.is_empty() {
        return Ok(TimelineChange::Unchanged);
    }

    let new_frames = update.new_frames();
    let phase = update.merge(owner, base.as_ref(), default_frame)?;
    Ok(TimelineChange::Replace { timeline: Timeline::single(phase), new_frames })
}
