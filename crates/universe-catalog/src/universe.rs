//! Universe: stars, planetary systems and bodies
//!
//! Stars, bodies and planetary systems live in arenas addressed by stable
//! ids. Bodies are never removed; replacing a body reuses its slot so frames
//! that name it stay valid.

use crate::body::Body;
use crate::frame::{FrameLookup, FrameType, ReferenceFrame};
use crate::frame_tree::FrameTree;
use crate::timeline::Timeline;
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StarId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SystemId(pub usize);

/// Reference to either a star or a body
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Selection {
    Star(StarId),
    Body(BodyId),
}

impl Selection {
    pub fn star(self) -> Option<StarId> {
        match self {
            Selection::Star(star) => Some(star),
            Selection::Body(_) => None,
        }
    }

    pub fn body(self) -> Option<BodyId> {
        match self {
            Selection::Body(body) => Some(body),
            Selection::Star(_) => None,
        }
    }

    pub fn is_star(self) -> bool {
        matches!(self, Selection::Star(_))
    }
}

#[derive(Clone, Debug)]
pub struct Star {
    pub name: String,
}

/// Bodies orbiting a star or a primary body
#[derive(Debug)]
pub struct PlanetarySystem {
    star: StarId,
    primary: Option<BodyId>,
    bodies: Vec<BodyId>,
}

impl PlanetarySystem {
    pub fn star(&self) -> StarId {
        self.star
    }

    pub fn primary(&self) -> Option<BodyId> {
        self.primary
    }

    pub fn bodies(&self) -> &[BodyId] {
        &self.bodies
    }
}

/// The planets of one star plus the star's frame tree
#[derive(Debug)]
pub struct SolarSystem {
    star: StarId,
    planets: SystemId,
    frame_tree: FrameTree,
}

impl SolarSystem {
    pub fn star(&self) -> StarId {
        self.star
    }

    pub fn planets(&self) -> SystemId {
        self.planets
    }

    pub fn frame_tree(&self) -> &FrameTree {
        &self.frame_tree
    }
}

#[derive(Debug, Default)]
pub struct Universe {
    stars: Vec<Star>,
    bodies: Vec<Body>,
    systems: Vec<PlanetarySystem>,
    solar_systems: BTreeMap<StarId, SolarSystem>,
}

impl Universe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_star(&mut self, name: impl Into<String>) -> StarId {
        self.stars.push(Star { name: name.into() });
        StarId(self.stars.len() - 1)
    }

    pub fn star(&self, id: StarId) -> Option<&Star> {
        self.stars.get(id.0)
    }

    pub fn find_star(&self, name: &str) -> Option<StarId> {
        self.stars
            .iter()
            .position(|s| s.name.eq_ignore_ascii_case(name))
            .map(StarId)
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.0)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(id.0)
    }

    pub fn bodies(&self) -> impl Iterator<Item = (BodyId, &Body)> {
        self.bodies.iter().enumerate().map(|(i, b)| (BodyId(i), b))
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Id the next added body will get
    pub fn next_body_id(&self) -> BodyId {
        BodyId(self.bodies.len())
    }

    pub fn system(&self, id: SystemId) -> Option<&PlanetarySystem> {
        self.systems.get(id.0)
    }

    pub fn solar_system(&self, star: StarId) -> Option<&SolarSystem> {
        self.solar_systems.get(&star)
    }

    pub fn solar_systems(&self) -> impl Iterator<Item = &SolarSystem> {
        self.solar_systems.values()
    }

    pub fn create_planetary_system(&mut self, star: StarId, primary: Option<BodyId>) -> SystemId {
        self.systems.push(PlanetarySystem { star, primary, bodies: Vec::new() });
        SystemId(self.systems.len() - 1)
    }

    pub fn get_or_create_solar_system(&mut self, star: StarId) -> &mut SolarSystem {
        let planets = match self.solar_systems.get(&star) {
            Some(existing) => existing.planets,
            None => self.create_planetary_system(star, None),
        };
        self.solar_systems.entry(star).or_insert_with(|| SolarSystem {
            star,
            planets,
            frame_tree: FrameTree::new(Selection::Star(star)),
        })
    }

    /// Satellite system of a body, created with the body as primary if missing
    pub fn get_or_create_satellites(&mut self, body: BodyId) -> Option<SystemId> {
        let existing = self.body(body)?.satellites();
        if existing.is_some() {
            return existing;
        }
        let star = self.star_of(Selection::Body(body))?;
        let system = self.create_planetary_system(star, Some(body));
        self.body_mut(body)?.set_satellites(system);
        Some(system)
    }

    /// Star system a star or body belongs to
    pub fn star_of(&self, selection: Selection) -> Option<StarId> {
        match selection {
            Selection::Star(star) => Some(star),
            Selection::Body(body) => Some(self.system(self.body(body)?.system())?.star()),
        }
    }

    pub fn find_in_system(&self, system: SystemId, name: &str) -> Option<BodyId> {
        self.system(system)?
            .bodies()
            .iter()
            .copied()
            .find(|&id| self.body(id).is_some_and(|b| b.name().eq_ignore_ascii_case(name)))
    }

    /// Resolve "Star/Planet/Moon"; a path may also start at a top-level body
    pub fn find_path(&self, path: &str) -> Option<Selection> {
        let mut names = path.split('/').map(str::trim).filter(|s| !s.is_empty());
        let first = names.next()?;

        let mut current = match self.find_star(first) {
            Some(star) => Selection::Star(star),
            None => Selection::Body(
                self.solar_systems
                    .values()
                    .find_map(|s| self.find_in_system(s.planets, first))?,
            ),
        };

        for name in names {
            let system = match current {
                Selection::Star(star) => self.solar_system(star)?.planets(),
                Selection::Body(body) => self.body(body)?.satellites()?,
            };
            current = Selection::Body(self.find_in_system(system, name)?);
        }

        Some(current)
    }

    /// Full path of a star or body, e.g. "Sol/Earth/Moon"
    pub fn path_of(&self, selection: Selection) -> String {
        match selection {
            Selection::Star(star) => self.star(star).map(|s| s.name.clone()).unwrap_or_default(),
            Selection::Body(id) => {
                let Some(body) = self.body(id) else { return String::new() };
                let parent = match self.system(body.system()) {
                    Some(system) => system.primary().map_or(Selection::Star(system.star()), Selection::Body),
                    None => return body.name().to_string(),
                };
                format!("{}/{}", self.path_of(parent), body.name())
            }
        }
    }

    pub fn frame_tree(&self, owner: Selection) -> Option<&FrameTree> {
        match owner {
            Selection::Star(star) => self.solar_system(star).map(SolarSystem::frame_tree),
            Selection::Body(body) => self.body(body)?.frame_tree(),
        }
    }

    fn get_or_create_frame_tree(&mut self, owner: Selection) -> Option<&mut FrameTree> {
        match owner {
            Selection::Star(star) => Some(&mut self.get_or_create_solar_system(star).frame_tree),
            Selection::Body(body) => Some(self.body_mut(body)?.get_or_create_frame_tree(body)),
        }
    }

    /// Default frame of the frame tree rooted at `owner`, creating the tree if needed
    pub fn default_frame(&mut self, owner: Selection) -> Option<Rc<ReferenceFrame>> {
        self.get_or_create_frame_tree(owner).map(FrameTree::default_frame)
    }

    /// Append a new body to a planetary system
    pub fn add_body(&mut self, system: SystemId, body: Body) -> BodyId {
        let id = self.next_body_id();
        self.bodies.push(body);
        if let Some(s) = self.systems.get_mut(system.0) {
            s.bodies.push(id);
        }
        self.register_children(id);
        id
    }

    /// Put a new body in the slot of an existing one
    ///
    /// The satellites and frame tree of the old body carry over, since the
    /// bodies orbiting it still refer to the same id.
    pub fn replace_body(&mut self, id: BodyId, mut body: Body) -> Option<Body> {
        let old = self.bodies.get_mut(id.0)?;
        if let Some(satellites) = old.satellites() {
            body.set_satellites(satellites);
        }
        body.set_frame_tree(old.take_frame_tree());

        self.unregister_children(id);
        let old = std::mem::replace(&mut self.bodies[id.0], body);
        self.register_children(id);
        Some(old)
    }

    /// Install a timeline on a body, returning the previous one
    pub fn set_timeline(&mut self, id: BodyId, timeline: Timeline) -> Option<Timeline> {
        self.body(id)?;
        self.unregister_children(id);
        let old = self.bodies[id.0].replace_timeline(timeline);
        self.register_children(id);
        Some(old)
    }

    fn orbit_centers(&self, id: BodyId) -> Vec<Selection> {
        let mut centers: Vec<Selection> = Vec::new();
        if let Some(body) = self.body(id) {
            for phase in body.timeline().phases() {
                let center = phase.orbit_frame().center();
                if !centers.contains(&center) {
                    centers.push(center);
                }
            }
        }
        centers
    }

    fn register_children(&mut self, id: BodyId) {
        for center in self.orbit_centers(id) {
            if let Some(tree) = self.get_or_create_frame_tree(center) {
                tree.add_child(id);
            }
        }
    }

    fn unregister_children(&mut self, id: BodyId) {
        for center in self.orbit_centers(id) {
            if let Some(tree) = self.get_or_create_frame_tree(center) {
                tree.remove_child(id);
            }
        }
    }
}

impl FrameLookup for Universe {
    fn body_frames(&self, body: BodyId, frame_type: FrameType) -> Vec<Rc<ReferenceFrame>> {
        self.body(body)
            .map(|b| b.timeline().frames(frame_type))
            .unwrap_or_default()
    }
}

/// Universe view in which one body's timeline is replaced by a candidate
///
/// Lets frame nesting be checked before the candidate is installed.
pub struct PendingTimeline<'a> {
    pub universe: &'a Universe,
    pub body: BodyId,
    pub timeline: &'a Timeline,
}

impl FrameLookup for PendingTimeline<'_> {
    fn body_frames(&self, body: BodyId, frame_type: FrameType) -> Vec<Rc<ReferenceFrame>> {
        if body == self.body {
            self.timeline.frames(frame_type)
        } else {
            self.universe.body_frames(body, frame_type)
        }
    }
}
