//! Timeline phases

use crate::frame::ReferenceFrame;
use crate::universe::BodyId;
use std::rc::Rc;
use universe_core::{Orbit, RotationModel};

/// Orbit, frames and rotation of one body over `[start, end)`
///
/// Phases are never modified; changing any field means building a new
/// phase. Cloning shares the frames, orbit and rotation model.
#[derive(Clone, Debug)]
pub struct TimelinePhase {
    owner: BodyId,
    start: f64,
    end: f64,
    orbit_frame: Rc<ReferenceFrame>,
    body_frame: Rc<ReferenceFrame>,
    orbit: Rc<dyn Orbit>,
    rotation_model: Rc<dyn RotationModel>,
}

impl TimelinePhase {
    /// Callers guarantee `start < end`
    pub fn new(
        owner: BodyId,
        start: f64,
        end: f64,
        orbit_frame: Rc<ReferenceFrame>,
        orbit: Rc<dyn Orbit>,
        body_frame: Rc<ReferenceFrame>,
        rotation_model: Rc<dyn RotationModel>,
    ) -> Self {
        debug_assert!(start < end, "phase start {} not before end {}", start, end);
        Self { owner, start, end, orbit_frame, body_frame, orbit, rotation_model }
    }

    pub fn owner(&self) -> BodyId {
        self.owner
    }

    pub fn start_time(&self) -> f64 {
        self.start
    }

    pub fn end_time(&self) -> f64 {
        self.end
    }

    pub fn orbit_frame(&self) -> &Rc<ReferenceFrame> {
        &self.orbit_frame
    }

    pub fn body_frame(&self) -> &Rc<ReferenceFrame> {
        &self.body_frame
    }

    pub fn orbit(&self) -> &Rc<dyn Orbit> {
        &self.orbit
    }

    pub fn rotation_model(&self) -> &Rc<dyn RotationModel> {
        &self.rotation_model
    }

    /// True if `t` is in `[start, end)`
    pub fn includes(&self, t: f64) -> bool {
        self.start <= t && t < self.end
    }
}
