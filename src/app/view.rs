use std::collections::HashSet;

use eframe::egui::{self, Color32, FontId, Pos2, Rect, Sense, Stroke, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::graph::{Hover, TOOLTIP_OPACITY};

use super::ViewModel;
use super::render_utils::{
    dim_color, draw_background, organization_color32, with_opacity, world_to_screen,
};

const EDGE_COLOR: Color32 = Color32::from_rgb(153, 153, 153);
const EDGE_EMPHASIS_COLOR: Color32 = Color32::from_rgb(214, 39, 40);
const SEARCH_MATCH_RING: Color32 = Color32::from_rgb(103, 196, 255);

impl ViewModel {
    fn cached_search_matches(&mut self) -> Option<HashSet<usize>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some((cached_query, matches)) = &self.search_match_cache
            && cached_query == query
        {
            return Some(matches.clone());
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .scene
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                matcher
                    .fuzzy_match(&node.name, query)
                    .or_else(|| matcher.fuzzy_match(&node.name.to_ascii_lowercase(), &query.to_ascii_lowercase()))
                    .map(|_| index)
            })
            .collect::<HashSet<_>>();

        self.search_match_cache = Some((query.to_owned(), matches.clone()));
        Some(matches)
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.pan, self.zoom);

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);

        // Animated mode: one simulation tick per frame, everything below
        // (edges included) re-binds to the fresh positions.
        if self.live_physics && self.scene.step() {
            ui.ctx().request_repaint();
        }
        if response.dragged() {
            ui.ctx().request_repaint();
        }

        let search_matches = self.cached_search_matches();
        let pan = self.pan;
        let zoom = self.zoom;

        let screen_positions: Vec<Pos2> = (0..self.scene.nodes.len())
            .map(|index| world_to_screen(rect, pan, zoom, self.scene.position(index)))
            .collect();
        let screen_radii: Vec<f32> = self
            .scene
            .nodes
            .iter()
            .map(|node| node.draw_radius * zoom)
            .collect();

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .filter(|position| rect.contains(*position));
        self.hover = Self::resolve_hover(&self.scene, pointer, &screen_positions, &screen_radii);

        if self.hover != Hover::None {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        for (index, edge) in self.scene.edges.iter().enumerate() {
            let opacity = self.scene.edge_opacity(self.hover, index);
            let (width, color) = if self.hover == Hover::Edge(index) {
                (2.5, EDGE_EMPHASIS_COLOR)
            } else {
                (1.5, EDGE_COLOR)
            };
            painter.line_segment(
                [screen_positions[edge.source], screen_positions[edge.target]],
                Stroke::new(width, with_opacity(color, opacity)),
            );
        }

        for (index, node) in self.scene.nodes.iter().enumerate() {
            let radius = screen_radii[index];
            if !(radius > 0.0) {
                continue;
            }

            let opacity = self.scene.node_opacity(self.hover, index);
            let mut fill = organization_color32(node.org_index);
            let matched = search_matches
                .as_ref()
                .map(|matches| matches.contains(&index));
            if matched == Some(false) {
                fill = dim_color(fill, 0.45);
            }

            let position = screen_positions[index];
            painter.circle_filled(position, radius, with_opacity(fill, opacity));
            painter.circle_stroke(
                position,
                radius,
                Stroke::new(2.0, with_opacity(Color32::BLACK, opacity)),
            );
            if matched == Some(true) {
                painter.circle_stroke(
                    position,
                    radius + 3.0,
                    Stroke::new(1.6, with_opacity(SEARCH_MATCH_RING, opacity)),
                );
            }
        }

        if let Some(pointer) = pointer {
            self.draw_tooltip(&painter, rect, pointer);
        }
    }

    /// Tooltip near the pointer, tracking it while the hover lasts.
    fn draw_tooltip(&self, painter: &egui::Painter, rect: Rect, pointer: Pos2) {
        let text = match self.hover {
            Hover::None => return,
            Hover::Node(index) => {
                let node = &self.scene.nodes[index];
                format!(
                    "Name: {}\nRole: {}\nOrganization: {}",
                    node.name, node.role, node.organization
                )
            }
            Hover::Edge(index) => {
                let edge = &self.scene.edges[index];
                format!(
                    "Source: {}\nTarget: {}",
                    self.scene.nodes[edge.source].id, self.scene.nodes[edge.target].id
                )
            }
        };

        let galley = painter.layout(text, FontId::proportional(13.0), Color32::BLACK, f32::INFINITY);
        let mut anchor = pointer + vec2(15.0, -15.0);
        // keep the tooltip inside the canvas
        anchor.x = anchor.x.min(rect.right() - galley.size().x - 12.0);
        anchor.y = anchor.y.max(rect.top() + 6.0);

        let background = Rect::from_min_size(anchor, galley.size()).expand(6.0);
        painter.rect_filled(
            background,
            4.0,
            with_opacity(Color32::WHITE, TOOLTIP_OPACITY),
        );
        painter.galley(anchor, galley, Color32::BLACK);
    }
}
