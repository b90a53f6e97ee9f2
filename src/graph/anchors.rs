use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::{Vec2, vec2};

pub const ANCHOR_RADIUS: f32 = 280.0;

/// Explicit organization -> angle table. The circle is divided into one equal
/// sector per organization, offset by a quarter turn so the first sector sits
/// on the vertical axis. Lookup of an unknown label is `None`, never an
/// undefined coordinate; the loader validates membership before this table is
/// ever consulted.
#[derive(Clone, Debug)]
pub struct AnchorLayout {
    labels: Vec<String>,
}

impl AnchorLayout {
    pub fn new(labels: &[String]) -> Self {
        Self {
            labels: labels.to_vec(),
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn index(&self, organization: &str) -> Option<usize> {
        self.labels.iter().position(|label| label == organization)
    }

    pub fn angle(&self, organization: &str) -> Option<f32> {
        let index = self.index(organization)?;
        let step = TAU / self.labels.len() as f32;
        Some(FRAC_PI_2 + index as f32 * step)
    }

    /// Anchor point in world coordinates (canvas center at the origin).
    pub fn anchor(&self, organization: &str) -> Option<Vec2> {
        let angle = self.angle(organization)?;
        Some(vec2(
            ANCHOR_RADIUS * angle.cos(),
            ANCHOR_RADIUS * angle.sin(),
        ))
    }
}
