//! Catalog loading
//!
//! Applies catalog entries to a universe one at a time. An entry that fails
//! is logged and counted; loading continues with the next one.

use crate::body::{Body, Classification, Location};
use crate::builder::{check_frames, create_timeline, TimelineChange};
use crate::config::{CatalogConfig, FrameCheckOrder, MAX_FRAME_DEPTH_LIMIT};
use crate::error::{CatalogError, CatalogResult};
use crate::universe::{BodyId, PendingTimeline, Selection, SystemId, Universe};
use crate::value::Hash;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

/// How an entry combines with an existing object of the same name
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Disposition {
    #[default]
    Add,
    Replace,
    Modify,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemType {
    #[default]
    Body,
    ReferencePoint,
    /// Surface location attached to the parent body
    Location,
    /// Any other catalog item; skipped
    #[serde(other)]
    Other,
}

/// One object definition in a catalog file
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(default)]
    pub disposition: Disposition,
    #[serde(default, rename = "type")]
    pub item_type: ItemType,
    pub name: String,
    /// Path of the parent star or body, e.g. "Sol/Earth"
    pub parent: String,
    #[serde(default)]
    pub data: Hash,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl LoadReport {
    pub fn merge(&mut self, other: LoadReport) {
        self.loaded += other.loaded;
        self.failed += other.failed;
        self.skipped += other.skipped;
    }
}

enum EntryOutcome {
    Loaded(BodyId),
    Location(BodyId),
    Skipped,
}

pub struct CatalogLoader<'a> {
    universe: &'a mut Universe,
    config: CatalogConfig,
}

impl<'a> CatalogLoader<'a> {
    /// A `max_frame_depth` above the limit is clamped
    pub fn new(universe: &'a mut Universe, mut config: CatalogConfig) -> Self {
        if config.max_frame_depth > MAX_FRAME_DEPTH_LIMIT {
            warn!(
                "Frame depth limit {} clamped to {}",
                config.max_frame_depth, MAX_FRAME_DEPTH_LIMIT
            );
            config.max_frame_depth = MAX_FRAME_DEPTH_LIMIT;
        }
        Self { universe, config }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Load a JSON catalog file; relative paths in it resolve against its directory
    pub fn load_file(&mut self, path: &Path) -> CatalogResult<LoadReport> {
        let contents = std::fs::read_to_string(path)?;
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let report = self.load_str(&contents, dir)?;
        info!(
            "Loaded {}: {} objects, {} failed, {} skipped",
            path.display(),
            report.loaded,
            report.failed,
            report.skipped
        );
        Ok(report)
    }

    pub fn load_str(&mut self, json: &str, dir: &Path) -> CatalogResult<LoadReport> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(json)?;
        Ok(self.load_entries(&entries, dir))
    }

    pub fn load_entries(&mut self, entries: &[CatalogEntry], dir: &Path) -> LoadReport {
        let mut report = LoadReport::default();
        for entry in entries {
            match self.load_entry(entry, dir) {
                Ok(EntryOutcome::Loaded(id)) => {
                    debug!("Loaded {} as body {}", entry.name, id.0);
                    report.loaded += 1;
                }
                Ok(EntryOutcome::Location(id)) => {
                    debug!("Added location {} to body {}", entry.name, id.0);
                    report.loaded += 1;
                }
                Ok(EntryOutcome::Skipped) => report.skipped += 1,
                Err(CatalogError::ParentNotFound(parent)) => {
                    warn!("Parent body '{}' of '{}' not found", parent, entry.name);
                    report.skipped += 1;
                }
                Err(e) => {
                    warn!("Error loading {}: {}", entry.name, e);
                    report.failed += 1;
                }
            }
        }
        report
    }

    fn load_entry(&mut self, entry: &CatalogEntry, dir: &Path) -> CatalogResult<EntryOutcome> {
        if entry.item_type == ItemType::Other {
            info!("Skipping unsupported catalog item {}", entry.name);
            return Ok(EntryOutcome::Skipped);
        }
        if entry.item_type == ItemType::Location {
            return self.load_location(entry);
        }

        let system = self.parent_system(&entry.parent)?;
        let existing = self.universe.find_in_system(system, &entry.name);

        let disposition = match (entry.disposition, existing) {
            (Disposition::Add, Some(_)) => {
                warn!("Duplicate definition of {}/{}", entry.parent, entry.name);
                Disposition::Add
            }
            (_, None) => Disposition::Add,
            (disposition, Some(_)) => disposition,
        };
        let owner = match (disposition, existing) {
            (Disposition::Add, _) | (_, None) => self.universe.next_body_id(),
            (_, Some(id)) => id,
        };

        let change = create_timeline(self.universe, owner, system, &entry.data, dir, disposition)?;
        let install_first =
            disposition == Disposition::Modify && self.config.frame_check == FrameCheckOrder::InstallThenCheck;

        let timeline = match change {
            TimelineChange::Unchanged => None,
            TimelineChange::Replace { timeline, new_frames } if install_first => {
                self.universe.set_timeline(owner, timeline);
                check_frames(&*self.universe, &new_frames, self.config.max_frame_depth)?;
                None
            }
            TimelineChange::Replace { timeline, new_frames } => {
                let pending = PendingTimeline { universe: &*self.universe, body: owner, timeline: &timeline };
                check_frames(&pending, &new_frames, self.config.max_frame_depth)?;
                Some(timeline)
            }
        };

        let orbits_body = self.universe.system(system).and_then(|s| s.primary()).is_some();
        match disposition {
            Disposition::Add | Disposition::Replace => {
                let timeline = timeline.ok_or(CatalogError::MissingOrbit)?;
                let mut body = Body::new(entry.name.clone(), system, timeline);
                apply_body_properties(&mut body, entry, orbits_body, dir, false);
                match existing.filter(|_| disposition == Disposition::Replace) {
                    Some(id) => {
                        self.universe.replace_body(id, body);
                    }
                    None => {
                        self.universe.add_body(system, body);
                    }
                }
            }
            Disposition::Modify => {
                if let Some(timeline) = timeline {
                    self.universe.set_timeline(owner, timeline);
                }
                if let Some(body) = self.universe.body_mut(owner) {
                    apply_body_properties(body, entry, orbits_body, dir, true);
                }
            }
        }

        Ok(EntryOutcome::Loaded(owner))
    }

    fn load_location(&mut self, entry: &CatalogEntry) -> CatalogResult<EntryOutcome> {
        let Some(Selection::Body(id)) = self.universe.find_path(&entry.parent) else {
            return Err(CatalogError::ParentNotFound(entry.parent.clone()));
        };
        let body = self
            .universe
            .body_mut(id)
            .ok_or_else(|| CatalogError::ParentNotFound(entry.parent.clone()))?;

        let location = create_location(&entry.data, entry.name.clone(), body);
        body.add_location(location);
        Ok(EntryOutcome::Location(id))
    }

    /// Planetary system that children of `parent` are added to
    fn parent_system(&mut self, parent: &str) -> CatalogResult<SystemId> {
        let not_found = || CatalogError::ParentNotFound(parent.to_string());
        match self.universe.find_path(parent).ok_or_else(not_found)? {
            Selection::Star(star) => Ok(self.universe.get_or_create_solar_system(star).planets()),
            Selection::Body(body) => self.universe.get_or_create_satellites(body).ok_or_else(not_found),
        }
    }
}

/// Physical and display properties; Modify starts from the body's current values
fn apply_body_properties(body: &mut Body, entry: &CatalogEntry, orbits_body: bool, dir: &Path, modify: bool) {
    let data = &entry.data;

    if entry.item_type == ItemType::ReferencePoint {
        body.semi_axes = Vector3::new(1.0, 1.0, 1.0);
        body.classification = Classification::Invisible;
        body.visible = false;
        body.visible_as_point = false;
        body.clickable = false;
    } else {
        let radius = data.get_number("Radius");
        if let Some(r) = radius {
            body.semi_axes = Vector3::repeat(r);
        }
        if let Some(axes) = data.get_vector("SemiAxes") {
            let axes = axes * radius.unwrap_or(1.0);
            // catalog z is the internal y axis
            body.semi_axes = Vector3::new(axes.x, axes.z, axes.y);
        } else if let Some(oblateness) = data.get_number("Oblateness") {
            body.semi_axes = Vector3::new(1.0, 1.0 - oblateness, 1.0) * body.radius();
        }

        let class = data.get_string("Class");
        match class.and_then(Classification::parse) {
            Some(classification) => body.classification = classification,
            None => {
                if let Some(name) = class {
                    warn!("Invalid class '{}' for {}", name, entry.name);
                }
                if class.is_some() || !modify || body.classification == Classification::Unknown {
                    body.classification = Classification::guess(body.radius(), orbits_body);
                }
            }
        }

        if class.is_some() || !modify {
            let hidden = body.classification == Classification::Invisible;
            body.visible = !hidden;
            body.visible_as_point = !matches!(
                body.classification,
                Classification::Invisible | Classification::SurfaceFeature | Classification::Component
            );
        }

        if let Some(url) = data.get_string("InfoURL") {
            body.info_url = Some(resolve_url(url, dir));
        }
        if let Some(albedo) = data.get_number("Albedo") {
            body.albedo = albedo as f32;
        }
        if let Some(mass) = data.get_number("Mass") {
            body.mass = mass;
        }
    }

    if let Some(visible) = data.get_boolean("Visible") {
        body.visible = visible;
    }
    if let Some(clickable) = data.get_boolean("Clickable") {
        body.clickable = clickable;
    }
    if let Some(color) = data.get_color("OrbitColor") {
        body.orbit_color = Some(color);
    }
}

fn create_location(data: &Hash, name: String, body: &Body) -> Location {
    let longlat = data.get_vector("LongLat").unwrap_or_else(Vector3::zeros);
    Location {
        name,
        position: body.planetocentric_to_cartesian(longlat.x, longlat.y, longlat.z),
        size: data.get_number("Size").unwrap_or(1.0) as f32,
        importance: data.get_number("Importance").unwrap_or(-1.0) as f32,
        feature_type: data.get_string("Type").map(str::to_string),
    }
}

/// Relative file references are taken from the catalog's directory
fn resolve_url(url: &str, dir: &Path) -> String {
    if url.contains("://") || Path::new(url).is_absolute() {
        url.to_string()
    } else {
        dir.join(url).display().to_string()
    }
}
