//! Frame trees
//!
//! Every body or solar system that something orbits carries a frame tree:
//! the shared default frame centered on the owner, plus the bodies whose
//! orbit frames are centered there.

use crate::frame::ReferenceFrame;
use crate::universe::{BodyId, Selection};
use std::rc::Rc;

#[derive(Debug)]
pub struct FrameTree {
    owner: Selection,
    default_frame: Option<Rc<ReferenceFrame>>,
    children: Vec<BodyId>,
}

impl FrameTree {
    pub fn new(owner: Selection) -> Self {
        Self { owner, default_frame: None, children: Vec::new() }
    }

    pub fn owner(&self) -> Selection {
        self.owner
    }

    /// Ecliptic J2000 frame centered on the owner, created on first use
    pub fn default_frame(&mut self) -> Rc<ReferenceFrame> {
        let owner = self.owner;
        self.default_frame
            .get_or_insert_with(|| Rc::new(ReferenceFrame::ecliptic(owner)))
            .clone()
    }

    pub fn children(&self) -> &[BodyId] {
        &self.children
    }

    pub fn add_child(&mut self, body: BodyId) {
        if !self.children.contains(&body) {
            self.children.push(body);
        }
    }

    pub fn remove_child(&mut self, body: BodyId) {
        self.children.retain(|&b| b != body);
    }
}
