//! Bodies: planets, moons, spacecraft and reference points

use crate::frame::ReferenceFrame;
use crate::frame_tree::FrameTree;
use crate::timeline::Timeline;
use crate::universe::{BodyId, Selection, SystemId};
use crate::value::Color;
use nalgebra::{UnitQuaternion, Vector3};
use std::f64::consts::{FRAC_PI_2, PI};
use std::rc::Rc;

/// Body classification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Classification {
    Unknown,
    Planet,
    Moon,
    Comet,
    Asteroid,
    Spacecraft,
    Invisible,
    SurfaceFeature,
    Component,
}

impl Classification {
    /// Parse a catalog class name (case-insensitive)
    pub fn parse(name: &str) -> Option<Classification> {
        let class = match name.to_ascii_lowercase().as_str() {
            "planet" => Self::Planet,
            "moon" => Self::Moon,
            "comet" => Self::Comet,
            "asteroid" => Self::Asteroid,
            "spacecraft" => Self::Spacecraft,
            "invisible" => Self::Invisible,
            "surfacefeature" => Self::SurfaceFeature,
            "component" => Self::Component,
            _ => return None,
        };
        Some(class)
    }

    /// Guess from radius (km) when the catalog gives no class
    pub fn guess(radius: f64, orbits_body: bool) -> Classification {
        if orbits_body {
            if radius > 0.1 { Self::Moon } else { Self::Spacecraft }
        } else if radius < 1000.0 {
            Self::Asteroid
        } else {
            Self::Planet
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Planet => "planet",
            Self::Moon => "moon",
            Self::Comet => "comet",
            Self::Asteroid => "asteroid",
            Self::Spacecraft => "spacecraft",
            Self::Invisible => "invisible",
            Self::SurfaceFeature => "surface feature",
            Self::Component => "component",
        }
    }
}

/// Named place on a body's surface
#[derive(Clone, Debug, PartialEq)]
pub struct Location {
    pub name: String,
    /// Body-fixed position (km)
    pub position: Vector3<f64>,
    /// Feature diameter (km)
    pub size: f32,
    pub importance: f32,
    pub feature_type: Option<String>,
}

/// A body in a planetary system
#[derive(Debug)]
pub struct Body {
    name: String,
    system: SystemId,
    timeline: Timeline,
    frame_tree: Option<FrameTree>,
    satellites: Option<SystemId>,
    locations: Vec<Location>,

    pub classification: Classification,
    /// Ellipsoid semi-axes (km)
    pub semi_axes: Vector3<f64>,
    pub albedo: f32,
    /// Mass (Earth masses)
    pub mass: f64,
    pub visible: bool,
    pub visible_as_point: bool,
    pub clickable: bool,
    pub info_url: Option<String>,
    pub orbit_color: Option<Color>,
}

impl Body {
    pub fn new(name: impl Into<String>, system: SystemId, timeline: Timeline) -> Self {
        Self {
            name: name.into(),
            system,
            timeline,
            frame_tree: None,
            satellites: None,
            locations: Vec::new(),
            classification: Classification::Unknown,
            semi_axes: Vector3::new(1.0, 1.0, 1.0),
            albedo: 0.5,
            mass: 0.0,
            visible: true,
            visible_as_point: true,
            clickable: true,
            info_url: None,
            orbit_color: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Planetary system this body belongs to
    pub fn system(&self) -> SystemId {
        self.system
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Swap in a new timeline, returning the old one
    pub(crate) fn replace_timeline(&mut self, timeline: Timeline) -> Timeline {
        std::mem::replace(&mut self.timeline, timeline)
    }

    pub fn frame_tree(&self) -> Option<&FrameTree> {
        self.frame_tree.as_ref()
    }

    pub fn get_or_create_frame_tree(&mut self, id: BodyId) -> &mut FrameTree {
        self.frame_tree.get_or_insert_with(|| FrameTree::new(Selection::Body(id)))
    }

    pub(crate) fn take_frame_tree(&mut self) -> Option<FrameTree> {
        self.frame_tree.take()
    }

    pub(crate) fn set_frame_tree(&mut self, tree: Option<FrameTree>) {
        self.frame_tree = tree;
    }

    pub fn satellites(&self) -> Option<SystemId> {
        self.satellites
    }

    pub(crate) fn set_satellites(&mut self, system: SystemId) {
        self.satellites = Some(system);
    }

    /// Largest semi-axis (km)
    pub fn radius(&self) -> f64 {
        self.semi_axes.max()
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn add_location(&mut self, location: Location) {
        self.locations.push(location);
    }

    pub fn find_location(&self, name: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.name == name)
    }

    /// Body-fixed position of longitude/latitude (degrees) at `altitude` km above the radius
    pub fn planetocentric_to_cartesian(&self, longitude: f64, latitude: f64, altitude: f64) -> Vector3<f64> {
        let phi = FRAC_PI_2 - latitude.to_radians();
        let theta = longitude.to_radians() - PI;
        Vector3::new(theta.cos() * phi.sin(), phi.cos(), -theta.sin() * phi.sin()) * (self.radius() + altitude)
    }

    pub fn orbit_frame(&self, t: f64) -> Option<&Rc<ReferenceFrame>> {
        self.timeline.find_phase(t).map(|p| p.orbit_frame())
    }

    pub fn body_frame(&self, t: f64) -> Option<&Rc<ReferenceFrame>> {
        self.timeline.find_phase(t).map(|p| p.body_frame())
    }

    /// Position (km) relative to the center of the orbit frame active at `t`
    pub fn position_at(&self, t: f64) -> Option<Vector3<f64>> {
        self.timeline.find_phase(t).map(|p| p.orbit().position_at(t))
    }

    /// Orientation relative to the body frame active at `t`
    pub fn orientation_at(&self, t: f64) -> Option<UnitQuaternion<f64>> {
        self.timeline.find_phase(t).map(|p| p.rotation_model().orientation_at(t))
    }
}
