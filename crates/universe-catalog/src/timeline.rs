//! Object timelines

use crate::error::{CatalogError, CatalogResult};
use crate::frame::{FrameType, ReferenceFrame};
use crate::phase::TimelinePhase;
use std::rc::Rc;

/// Contiguous sequence of phases describing one body over time
#[derive(Clone, Debug, Default)]
pub struct Timeline {
    phases: Vec<TimelinePhase>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timeline with exactly one phase
    pub fn single(phase: TimelinePhase) -> Self {
        Self { phases: vec![phase] }
    }

    /// Append a phase; it must start exactly where the last one ends
    pub fn append_phase(&mut self, phase: TimelinePhase) -> CatalogResult<()> {
        if let Some(last) = self.phases.last() {
            if last.end_time() != phase.start_time() {
                return Err(CatalogError::DiscontiguousPhase {
                    previous_end: last.end_time(),
                    start: phase.start_time(),
                });
            }
        }
        self.phases.push(phase);
        Ok(())
    }

    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn phase(&self, index: usize) -> Option<&TimelinePhase> {
        self.phases.get(index)
    }

    pub fn phases(&self) -> &[TimelinePhase] {
        &self.phases
    }

    /// Start of the first phase (`+inf` when empty)
    pub fn start_time(&self) -> f64 {
        self.phases.first().map_or(f64::INFINITY, TimelinePhase::start_time)
    }

    /// End of the last phase (`-inf` when empty)
    pub fn end_time(&self) -> f64 {
        self.phases.last().map_or(f64::NEG_INFINITY, TimelinePhase::end_time)
    }

    pub fn includes(&self, t: f64) -> bool {
        self.start_time() <= t && t < self.end_time()
    }

    /// Phase active at `t`; times outside the timeline clamp to the first or last phase
    pub fn find_phase(&self, t: f64) -> Option<&TimelinePhase> {
        if self.phases.is_empty() {
            return None;
        }
        let index = self.phases.partition_point(|p| p.end_time() <= t);
        self.phases.get(index.min(self.phases.len() - 1))
    }

    /// Distinct orbit frames (Position) or body frames (Orientation) used by the phases
    pub fn frames(&self, frame_type: FrameType) -> Vec<Rc<ReferenceFrame>> {
        let mut frames: Vec<Rc<ReferenceFrame>> = Vec::new();
        for phase in &self.phases {
            let frame = match frame_type {
                FrameType::Position => phase.orbit_frame(),
                FrameType::Orientation => phase.body_frame(),
            };
            if !frames.iter().any(|f| Rc::ptr_eq(f, frame)) {
                frames.push(frame.clone());
            }
        }
        frames
    }
}
