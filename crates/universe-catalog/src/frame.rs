//! Reference frames
//!
//! Frames are immutable once built and shared with `Rc` between the phases
//! and timelines that use them. A frame never owns the bodies it depends on;
//! it names them by id, and nesting is resolved through a [`FrameLookup`].

use crate::universe::{BodyId, Selection};
use nalgebra::Vector3;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

/// Which part of a body's motion a frame dependency follows
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameType {
    /// Follows orbit frames
    Position,
    /// Follows body frames
    Orientation,
}

/// Role a frame plays in a timeline phase
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameRole {
    Orbit,
    Body,
}

impl FrameRole {
    pub fn frame_type(self) -> FrameType {
        match self {
            FrameRole::Orbit => FrameType::Position,
            FrameRole::Body => FrameType::Orientation,
        }
    }
}

impl fmt::Display for FrameRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameRole::Orbit => write!(f, "Orbit"),
            FrameRole::Body => write!(f, "Body"),
        }
    }
}

/// Fundamental plane of an inertial frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StaticPlane {
    Ecliptic,
    Equator,
}

/// Frame axis selected by a two-vector frame definition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    PosX,
    PosY,
    PosZ,
    NegX,
    NegY,
    NegZ,
}

impl Axis {
    /// Parse "x", "-y", "+z" (case-insensitive)
    pub fn parse(name: &str) -> Option<Axis> {
        match name.trim().to_ascii_lowercase().as_str() {
            "x" | "+x" => Some(Axis::PosX),
            "y" | "+y" => Some(Axis::PosY),
            "z" | "+z" => Some(Axis::PosZ),
            "-x" => Some(Axis::NegX),
            "-y" => Some(Axis::NegY),
            "-z" => Some(Axis::NegZ),
            _ => None,
        }
    }

    /// Axis index ignoring sign
    pub fn index(self) -> usize {
        match self {
            Axis::PosX | Axis::NegX => 0,
            Axis::PosY | Axis::NegY => 1,
            Axis::PosZ | Axis::NegZ => 2,
        }
    }
}

/// Direction used to build one axis of a two-vector frame
#[derive(Clone, Debug)]
pub enum FrameVector {
    RelativePosition { observer: Selection, target: Selection },
    RelativeVelocity { observer: Selection, target: Selection },
    /// Fixed direction, optionally expressed in another frame
    Constant {
        direction: Vector3<f64>,
        frame: Option<Rc<ReferenceFrame>>,
    },
}

#[derive(Clone, Debug)]
pub struct FrameAxis {
    pub axis: Axis,
    pub vector: FrameVector,
}

#[derive(Clone, Debug)]
pub enum FrameKind {
    /// Inertial J2000 frame
    Static(StaticPlane),
    /// Rotates with the center body
    BodyFixed,
    /// Equator of `object`, optionally frozen at an epoch
    MeanEquator { object: Selection, freeze_epoch: Option<f64> },
    /// Axes follow the motion of `target` around the center
    OrbitSynchronized { target: Selection },
    /// Axes built from two direction vectors
    TwoVector { primary: FrameAxis, secondary: FrameAxis },
}

/// Coordinate system with a center and an axis convention
#[derive(Clone, Debug)]
pub struct ReferenceFrame {
    center: Selection,
    kind: FrameKind,
}

/// Access to the frames a body's timeline uses
pub trait FrameLookup {
    /// Orbit frames (Position) or body frames (Orientation) of every phase of the body
    fn body_frames(&self, body: BodyId, frame_type: FrameType) -> Vec<Rc<ReferenceFrame>>;
}

impl ReferenceFrame {
    pub fn new(center: Selection, kind: FrameKind) -> Self {
        Self { center, kind }
    }

    /// Ecliptic J2000 frame, the default for catalog objects
    pub fn ecliptic(center: Selection) -> Self {
        Self::new(center, FrameKind::Static(StaticPlane::Ecliptic))
    }

    pub fn center(&self) -> Selection {
        self.center
    }

    pub fn kind(&self) -> &FrameKind {
        &self.kind
    }

    /// Catalog keyword for this frame kind
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            FrameKind::Static(StaticPlane::Ecliptic) => "EclipticJ2000",
            FrameKind::Static(StaticPlane::Equator) => "EquatorJ2000",
            FrameKind::BodyFixed => "BodyFixed",
            FrameKind::MeanEquator { .. } => "MeanEquator",
            FrameKind::OrbitSynchronized { .. } => "OrbitSynchronized",
            FrameKind::TwoVector { .. } => "TwoVector",
        }
    }

    /// Frames this frame is composed on top of
    pub fn nested_frames(&self) -> Vec<&Rc<ReferenceFrame>> {
        match &self.kind {
            FrameKind::TwoVector { primary, secondary } => [primary, secondary]
                .into_iter()
                .filter_map(|a| match &a.vector {
                    FrameVector::Constant { frame: Some(frame), .. } => Some(frame),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Every object this frame or a nested frame names
    pub fn referenced_objects(&self) -> Vec<Selection> {
        let mut objects = vec![self.center];
        match &self.kind {
            FrameKind::Static(_) | FrameKind::BodyFixed => {}
            FrameKind::MeanEquator { object, .. } => objects.push(*object),
            FrameKind::OrbitSynchronized { target } => objects.push(*target),
            FrameKind::TwoVector { primary, secondary } => {
                for axis in [primary, secondary] {
                    match &axis.vector {
                        FrameVector::RelativePosition { observer, target }
                        | FrameVector::RelativeVelocity { observer, target } => {
                            objects.extend([*observer, *target]);
                        }
                        FrameVector::Constant { frame: Some(frame), .. } => {
                            objects.extend(frame.referenced_objects());
                        }
                        FrameVector::Constant { frame: None, .. } => {}
                    }
                }
            }
        }
        objects
    }

    /// Depth of frame nesting reachable from this frame
    ///
    /// Returns a value greater than `max_depth` as soon as that depth is
    /// exceeded or a body is reached again while its own frames are being
    /// walked, so a cycle in the frame graph terminates.
    pub fn nesting_depth(&self, lookup: &dyn FrameLookup, max_depth: u32, frame_type: FrameType) -> u32 {
        DepthWalk::new(lookup, max_depth).frame(self, 0, frame_type)
    }

    pub fn is_circular(&self, lookup: &dyn FrameLookup, max_depth: u32, frame_type: FrameType) -> bool {
        self.nesting_depth(lookup, max_depth, frame_type) > max_depth
    }
}

/// One nesting walk over the frame graph
///
/// Heights below a body are cached per frame type once fully known, so
/// shared dependencies are walked once.
struct DepthWalk<'a> {
    lookup: &'a dyn FrameLookup,
    max_depth: u32,
    heights: HashMap<(BodyId, FrameType), u32>,
    active: HashSet<(BodyId, FrameType)>,
}

impl<'a> DepthWalk<'a> {
    fn new(lookup: &'a dyn FrameLookup, max_depth: u32) -> Self {
        Self {
            lookup,
            max_depth,
            heights: HashMap::new(),
            active: HashSet::new(),
        }
    }

    fn frame(&mut self, frame: &ReferenceFrame, depth: u32, frame_type: FrameType) -> u32 {
        if depth > self.max_depth {
            return depth;
        }

        let n = self.selection(frame.center, depth, frame_type);
        if n > self.max_depth {
            return n;
        }

        let m = match &frame.kind {
            FrameKind::Static(_) => depth,
            FrameKind::BodyFixed => self.selection(frame.center, depth, FrameType::Orientation),
            FrameKind::MeanEquator { object, .. } => self.selection(*object, depth, FrameType::Orientation),
            FrameKind::OrbitSynchronized { target } => self.selection(*target, depth, FrameType::Position),
            FrameKind::TwoVector { primary, secondary } => {
                let p = self.vector(&primary.vector, depth, frame_type);
                if p > self.max_depth {
                    return p;
                }
                p.max(self.vector(&secondary.vector, depth, frame_type))
            }
        };
        n.max(m)
    }

    fn vector(&mut self, vector: &FrameVector, depth: u32, frame_type: FrameType) -> u32 {
        match vector {
            FrameVector::RelativePosition { observer, target }
            | FrameVector::RelativeVelocity { observer, target } => {
                let n = self.selection(*observer, depth, FrameType::Position);
                if n > self.max_depth {
                    return n;
                }
                n.max(self.selection(*target, depth, FrameType::Position))
            }
            FrameVector::Constant { frame: Some(frame), .. } => self.frame(frame, depth + 1, frame_type),
            FrameVector::Constant { frame: None, .. } => depth,
        }
    }

    /// Depth contributed by a frame center; stars end the walk
    fn selection(&mut self, selection: Selection, depth: u32, frame_type: FrameType) -> u32 {
        if depth > self.max_depth {
            return depth;
        }

        let body = match selection {
            Selection::Body(body) => body,
            Selection::Star(_) => return depth,
        };

        let key = (body, frame_type);
        if let Some(height) = self.heights.get(&key) {
            return depth + height;
        }
        if !self.active.insert(key) {
            return self.max_depth.saturating_add(1);
        }

        let mut n = depth;
        for frame in self.lookup.body_frames(body, frame_type) {
            n = n.max(self.frame(&frame, depth + 1, frame_type));
            if n > self.max_depth {
                break;
            }
        }

        self.active.remove(&key);
        if n <= self.max_depth {
            self.heights.insert(key, n - depth);
        }
        n
    }
}
