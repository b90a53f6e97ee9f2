use std::collections::{HashSet, VecDeque};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Vec2};

use crate::data::{Dataset, EdgeSet, LoadOptions, load_dataset};
use crate::graph::{AnchorLayout, FREQUENCY_THRESHOLD, Hover, Scene};

mod interaction;
mod panels;
mod render_utils;
mod view;

pub struct ClusterMapApp {
    options: LoadOptions,
    settle_on_load: bool,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

type LoadResult = Result<Box<LoadedGraph>, String>;

struct LoadedGraph {
    dataset: Dataset,
    anchors: AnchorLayout,
    scene: Scene,
    settle_steps: Option<usize>,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    dataset: Dataset,
    anchors: AnchorLayout,
    scene: Scene,
    edge_set: EdgeSet,
    frequency_threshold: f32,
    live_physics: bool,
    hover: Hover,
    search: String,
    search_match_cache: Option<(String, HashSet<usize>)>,
    settle_steps: Option<usize>,
    pan: Vec2,
    zoom: f32,
    show_fps_bar: bool,
    fps_current: f32,
    fps_samples: VecDeque<f32>,
}

impl ClusterMapApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        options: LoadOptions,
        settle_on_load: bool,
    ) -> Self {
        let state = Self::start_load(options.clone(), settle_on_load);
        Self {
            options,
            settle_on_load,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(options: LoadOptions, settle_on_load: bool) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        // The whole pipeline up to (and, in pre-settled mode, including) the
        // blocking settle pass runs off the UI thread; the UI only ever
        // receives a finished scene.
        thread::spawn(move || {
            let result = load_graph(&options, settle_on_load).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(options: LoadOptions, settle_on_load: bool) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(options, settle_on_load),
        }
    }
}

fn load_graph(options: &LoadOptions, settle_on_load: bool) -> anyhow::Result<Box<LoadedGraph>> {
    let dataset = load_dataset(options)?;
    let anchors = AnchorLayout::new(&dataset.anchor_labels);
    let mut scene = Scene::build(
        &dataset,
        &anchors,
        dataset.edges(EdgeSet::Official),
        FREQUENCY_THRESHOLD,
    )?;
    let settle_steps = settle_on_load.then(|| scene.settle());

    Ok(Box::new(LoadedGraph {
        dataset,
        anchors,
        scene,
        settle_steps,
    }))
}

impl eframe::App for ClusterMapApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(loaded) => {
                            AppState::Ready(Box::new(ViewModel::new(*loaded, self.settle_on_load)))
                        }
                        Err(error) => AppState::Error(error),
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading people and relationship tables...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the cluster map dataset");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition =
                            Some(Self::start_load(self.options.clone(), self.settle_on_load));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.options.clone(), self.settle_on_load));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => {
                            transition = Some(match result {
                                Ok(loaded) => AppState::Ready(Box::new(ViewModel::new(
                                    *loaded,
                                    self.settle_on_load,
                                ))),
                                Err(error) => AppState::Error(error),
                            });
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(AppState::Error("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
