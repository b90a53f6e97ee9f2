use std::collections::VecDeque;

use eframe::egui::{self, Align, Context, Layout, Sense, Vec2, vec2};

use crate::data::EdgeSet;
use crate::graph::Hover;

use super::render_utils::organization_color32;
use super::{LoadedGraph, ViewModel};

const FPS_SAMPLE_WINDOW: usize = 180;

impl ViewModel {
    pub(in crate::app) fn new(loaded: LoadedGraph, settle_on_load: bool) -> Self {
        Self {
            dataset: loaded.dataset,
            anchors: loaded.anchors,
            scene: loaded.scene,
            edge_set: EdgeSet::Official,
            frequency_threshold: crate::graph::FREQUENCY_THRESHOLD,
            live_physics: !settle_on_load,
            hover: Hover::None,
            search: String::new(),
            search_match_cache: None,
            settle_steps: loaded.settle_steps,
            pan: Vec2::ZERO,
            zoom: 1.0,
            show_fps_bar: true,
            fps_current: 0.0,
            fps_samples: VecDeque::new(),
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        reload_requested: &mut bool,
        is_reloading: bool,
    ) {
        self.update_fps_counter(ctx);

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("orgmap");
                    ui.separator();
                    ui.label(format!("people: {}", self.dataset.person_count()));
                    ui.label(format!(
                        "organizations: {}",
                        self.dataset.organization_count()
                    ));
                    ui.label(format!(
                        "edges shown: {} of {} {}",
                        self.scene.edges.len(),
                        self.dataset.edges(self.edge_set).len(),
                        self.edge_set.label()
                    ));
                    let reload_button =
                        ui.add_enabled(!is_reloading, egui::Button::new("Reload data"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(fps_text) = self.fps_display_text() {
                            ui.label(fps_text);
                        }
                        ui.label(self.settle_status_text());
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(290.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_reloading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Reloading tables...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_graph(ui);
            }
        });
    }

    fn draw_controls(&mut self, ui: &mut egui::Ui) {
        ui.add_space(4.0);
        ui.heading("Search");
        ui.text_edit_singleline(&mut self.search);

        ui.add_space(10.0);
        ui.heading("Relationships");
        let mut edges_dirty = false;
        edges_dirty |= ui
            .radio_value(&mut self.edge_set, EdgeSet::Official, "Official links")
            .changed();
        let has_unofficial = !self.dataset.unofficial.is_empty();
        let unofficial = ui.add_enabled(
            has_unofficial,
            egui::RadioButton::new(self.edge_set == EdgeSet::Unofficial, "Unofficial links"),
        );
        if unofficial.clicked() {
            self.edge_set = EdgeSet::Unofficial;
            edges_dirty = true;
        }
        if !has_unofficial {
            ui.small("no unofficial table loaded");
        }

        ui.add_space(4.0);
        edges_dirty |= ui
            .add(
                egui::Slider::new(&mut self.frequency_threshold, 0.0..=20.0)
                    .text("frequency threshold"),
            )
            .changed();
        if edges_dirty {
            self.rebuild_edges();
        }

        ui.add_space(10.0);
        ui.heading("Layout");
        ui.checkbox(&mut self.live_physics, "Animate settling");
        ui.horizontal(|ui| {
            if ui.button("Settle now").clicked() {
                self.settle_steps = Some(self.scene.settle());
            }
            if ui.button("Restart animation").clicked() {
                self.scene.reheat();
                self.live_physics = true;
                ui.ctx().request_repaint();
            }
        });

        ui.add_space(10.0);
        ui.heading("Organizations");
        if self.dataset.buckets.is_empty() {
            ui.small("no people loaded");
        }
        for (org_index, label) in self.anchors.labels().to_vec().iter().enumerate() {
            let members = self.dataset.buckets.members(label).len();
            ui.horizontal(|ui| {
                let (swatch, _) = ui.allocate_exact_size(vec2(12.0, 12.0), Sense::hover());
                ui.painter()
                    .rect_filled(swatch, 2.0, organization_color32(org_index));
                ui.label(format!("{label} ({members})"));
            });
        }

        ui.add_space(10.0);
        ui.checkbox(&mut self.show_fps_bar, "Show frame stats");
    }

    /// Edge set or threshold changed: re-resolve and re-filter edges while
    /// leaving node positions alone. Edge indices shift, so the hover state
    /// cannot survive the swap.
    fn rebuild_edges(&mut self) {
        self.hover = Hover::None;
        self.scene
            .set_edges(self.dataset.edges(self.edge_set), self.frequency_threshold);
    }

    fn settle_status_text(&self) -> String {
        if self.scene.settled() {
            match self.settle_steps {
                Some(steps) => format!("settled ({steps} steps)"),
                None => "settled".to_owned(),
            }
        } else {
            format!("settling, alpha {:.3}", self.scene.alpha())
        }
    }

    fn update_fps_counter(&mut self, ctx: &Context) {
        let dt = ctx.input(|input| input.stable_dt);
        if dt <= f32::EPSILON {
            return;
        }

        self.fps_current = (1.0 / dt).clamp(0.0, 1000.0);
        self.fps_samples.push_back(self.fps_current);
        while self.fps_samples.len() > FPS_SAMPLE_WINDOW {
            self.fps_samples.pop_front();
        }
    }

    fn fps_display_text(&self) -> Option<String> {
        if !self.show_fps_bar || self.fps_samples.is_empty() {
            return None;
        }

        let average = self.fps_samples.iter().sum::<f32>() / self.fps_samples.len() as f32;
        Some(format!(
            "FPS {:.0} | avg {:.1} | {:.1} ms",
            self.fps_current,
            average,
            1000.0 / self.fps_current.max(f32::EPSILON)
        ))
    }
}
