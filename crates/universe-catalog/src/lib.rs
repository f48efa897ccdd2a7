//! Catalog loading for the universe scene graph
//!
//! Bodies get their motion from a [`Timeline`]: contiguous phases, each
//! binding an orbit and rotation model to reference frames over a time span.
//! The [`CatalogLoader`] builds timelines from catalog entries and installs
//! them, merging with existing bodies according to each entry's disposition.

pub mod body;
pub mod builder;
pub mod config;
pub mod error;
pub mod frame;
pub mod frame_tree;
pub mod loader;
pub mod parse;
pub mod phase;
pub mod timeline;
pub mod universe;
pub mod value;

#[cfg(test)]
mod tests;

pub use body::{Body, Classification, Location};
pub use builder::{check_frames, create_timeline, orbit_barycenter, PhaseUpdate, TimelineChange};
pub use config::{CatalogConfig, FrameCheckOrder, MAX_FRAME_DEPTH_LIMIT};
pub use error::{CatalogError, CatalogResult};
pub use frame::{Axis, FrameKind, FrameLookup, FrameRole, FrameType, FrameVector, ReferenceFrame, StaticPlane};
pub use frame_tree::FrameTree;
pub use loader::{CatalogEntry, CatalogLoader, Disposition, ItemType, LoadReport};
pub use parse::{create_orbit, create_reference_frame, create_rotation_model, parse_date};
pub use phase::TimelinePhase;
pub use timeline::Timeline;
pub use universe::{BodyId, PendingTimeline, Selection, StarId, SystemId, Universe};
pub use value::{Color, Hash, Value};
