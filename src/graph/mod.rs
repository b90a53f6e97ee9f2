use std::collections::HashMap;

use eframe::egui::Vec2;

mod anchors;
mod build;
mod simulation;

pub use anchors::{ANCHOR_RADIUS, AnchorLayout};
pub use simulation::Body;
use simulation::Simulation;

pub const FREQUENCY_THRESHOLD: f32 = 5.0;
pub const FULL_OPACITY: f32 = 1.0;
pub const FADE_OPACITY: f32 = 0.1;
pub const TOOLTIP_OPACITY: f32 = 0.9;

/// Categorical palette (d3 schemeCategory10), indexed by anchor-table order.
const CATEGORY_PALETTE: [(u8, u8, u8); 10] = [
    (0x1f, 0x77, 0xb4),
    (0xff, 0x7f, 0x0e),
    (0x2c, 0xa0, 0x2c),
    (0xd6, 0x27, 0x28),
    (0x94, 0x67, 0xbd),
    (0x8c, 0x56, 0x4b),
    (0xe3, 0x77, 0xc2),
    (0x7f, 0x7f, 0x7f),
    (0xbc, 0xbd, 0x22),
    (0x17, 0xbe, 0xcf),
];

pub fn organization_color(index: usize) -> (u8, u8, u8) {
    CATEGORY_PALETTE[index % CATEGORY_PALETTE.len()]
}

/// The three mutually exclusive pointer states. Indices refer into
/// `Scene::nodes` / `Scene::edges`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Hover {
    #[default]
    None,
    Node(usize),
    Edge(usize),
}

pub struct SceneNode {
    pub id: String,
    pub name: String,
    pub role: String,
    pub organization: String,
    /// Index into the anchor table; also selects the palette color.
    pub org_index: usize,
    /// Visual radius `(impOfPeople + 2) / 9 * 20`; a NaN importance degrades
    /// to 0 (an invisible node) instead of poisoning the painter.
    pub draw_radius: f32,
}

pub struct SceneEdge {
    pub source: usize,
    pub target: usize,
    pub frequency: f32,
}

impl SceneEdge {
    pub fn touches(&self, node: usize) -> bool {
        self.source == node || self.target == node
    }
}

/// Everything the renderers bind to: people with simulated positions, the
/// filtered edge list of the selected edge set, and the identifier index the
/// endpoints were resolved through.
pub struct Scene {
    pub nodes: Vec<SceneNode>,
    pub bodies: Vec<Body>,
    pub edges: Vec<SceneEdge>,
    index_by_id: HashMap<String, usize>,
    simulation: Simulation,
}

impl Scene {
    pub fn position(&self, index: usize) -> Vec2 {
        self.bodies[index].pos
    }

    pub fn alpha(&self) -> f32 {
        self.simulation.alpha()
    }

    pub fn settled(&self) -> bool {
        self.simulation.settled()
    }

    /// One animated tick; false once the layout has settled.
    pub fn step(&mut self) -> bool {
        self.simulation.step(&mut self.bodies)
    }

    /// Synchronous settle-to-convergence; returns the steps taken.
    pub fn settle(&mut self) -> usize {
        self.simulation.settle(&mut self.bodies)
    }

    pub fn reheat(&mut self) {
        self.simulation.reheat();
    }

    pub fn node_opacity(&self, hover: Hover, index: usize) -> f32 {
        match hover {
            Hover::None => FULL_OPACITY,
            Hover::Node(hovered) if hovered == index => FULL_OPACITY,
            Hover::Edge(hovered) if self.edges[hovered].touches(index) => FULL_OPACITY,
            _ => FADE_OPACITY,
        }
    }

    pub fn edge_opacity(&self, hover: Hover, index: usize) -> f32 {
        match hover {
            Hover::None => FULL_OPACITY,
            Hover::Node(hovered) if self.edges[index].touches(hovered) => FULL_OPACITY,
            Hover::Edge(hovered) if hovered == index => FULL_OPACITY,
            _ => FADE_OPACITY,
        }
    }
}
