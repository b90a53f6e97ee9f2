use eframe::egui::{self, Pos2, Rect, Ui};

use crate::graph::{Hover, Scene};

use super::ViewModel;
use super::render_utils::{point_segment_distance, screen_to_world};

/// How close (in screen pixels) the pointer must be to a line before it
/// counts as hovering the edge.
const EDGE_HOVER_TOLERANCE: f32 = 4.0;

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.05, 6.0);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
            || response.dragged_by(egui::PointerButton::Primary)
        {
            self.pan += response.drag_delta();
        }
    }

    /// Pointer-state resolution: a node under the pointer wins, otherwise the
    /// nearest edge within tolerance, otherwise nothing. The three states are
    /// mutually exclusive by construction.
    pub(in crate::app) fn resolve_hover(
        scene: &Scene,
        pointer: Option<Pos2>,
        screen_positions: &[Pos2],
        screen_radii: &[f32],
    ) -> Hover {
        let Some(pointer) = pointer else {
            return Hover::None;
        };

        let hovered_node = (0..scene.nodes.len())
            .filter_map(|index| {
                let distance = screen_positions[index].distance(pointer);
                (distance <= screen_radii[index]).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((index, _)) = hovered_node {
            return Hover::Node(index);
        }

        let hovered_edge = scene
            .edges
            .iter()
            .enumerate()
            .filter_map(|(index, edge)| {
                let distance = point_segment_distance(
                    pointer,
                    screen_positions[edge.source],
                    screen_positions[edge.target],
                );
                (distance <= EDGE_HOVER_TOLERANCE).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((index, _)) = hovered_edge {
            return Hover::Edge(index);
        }

        Hover::None
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use crate::data::{EdgeSet, build_dataset};
    use crate::graph::{AnchorLayout, FREQUENCY_THRESHOLD};

    use super::*;

    fn scene() -> Scene {
        let people = "\
name,role,organization,impOfPeople,impOforganization,clusterSize
A One,Role,X,5,1,1
B Two,Role,Y,5,1,1
";
        let links = "source,target,frequency\nA One,B Two,10\n";
        let dataset = build_dataset(people, links, None, None).unwrap();
        let anchors = AnchorLayout::new(&dataset.anchor_labels);
        Scene::build(
            &dataset,
            &anchors,
            dataset.edges(EdgeSet::Official),
            FREQUENCY_THRESHOLD,
        )
        .unwrap()
    }

    #[test]
    fn node_wins_over_edge_and_tolerance_bounds_edges() {
        let scene = scene();
        let positions = vec![pos2(100.0, 100.0), pos2(300.0, 100.0)];
        let radii = vec![15.0, 15.0];

        assert_eq!(
            ViewModel::resolve_hover(&scene, Some(pos2(104.0, 103.0)), &positions, &radii),
            Hover::Node(0)
        );
        assert_eq!(
            ViewModel::resolve_hover(&scene, Some(pos2(200.0, 102.0)), &positions, &radii),
            Hover::Edge(0)
        );
        assert_eq!(
            ViewModel::resolve_hover(&scene, Some(pos2(200.0, 120.0)), &positions, &radii),
            Hover::None
        );
        assert_eq!(
            ViewModel::resolve_hover(&scene, None, &positions, &radii),
            Hover::None
        );
    }
}
