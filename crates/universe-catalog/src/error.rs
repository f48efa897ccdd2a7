//! Error types for catalog loading

use crate::frame::FrameRole;
use thiserror::Error;

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur while building one catalog object
///
/// Errors never name the object being built; the loader adds that context
/// when it reports them.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Timeline must be an array")]
    TimelineNotArray,

    #[error("Timeline has no phases")]
    EmptyTimeline,

    #[error("Timeline phase {0} is not a property group")]
    PhaseNotGroup(usize),

    #[error("Error in timeline phase {index}: {source}")]
    Phase {
        index: usize,
        #[source]
        source: Box<CatalogError>,
    },

    #[error("Beginning can only be specified for initial phase of timeline")]
    BeginningNotAllowed,

    #[error("Ending is required for all timeline phases other than the final one")]
    EndingRequired,

    #[error("Phase begins at {start} but ends at {end}")]
    InvalidTimeRange { start: f64, end: f64 },

    #[error("Phase starting at {start} does not follow the previous phase ending at {previous_end}")]
    DiscontiguousPhase { previous_end: f64, start: f64 },

    #[error("No valid orbit specified")]
    MissingOrbit,

    #[error("Invalid orbit: {0}")]
    InvalidOrbit(String),

    #[error("Invalid rotation model: {0}")]
    InvalidRotation(String),

    #[error("Invalid reference frame: {0}")]
    InvalidFrame(String),

    #[error("Object '{0}' not found")]
    UnknownObject(String),

    #[error("OrbitBarycenter must be in same star system")]
    BarycenterOutsideSystem,

    #[error("{role} frame center must be in same star system")]
    FrameOutsideSystem { role: FrameRole },

    #[error("{role} frame is nested too deep (probably circular)")]
    CircularFrame { role: FrameRole },

    #[error("Parent body '{0}' not found")]
    ParentNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CatalogError {
    /// Attach a 1-based timeline phase index
    pub fn in_phase(self, index: usize) -> Self {
        CatalogError::Phase { index, source: Box::new(self) }
    }
}
