use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};

use eframe::egui::{self, Context, Pos2, Vec2};
use tracing::{info, warn};

use crate::citizens::source::SourceFailure;
use crate::citizens::{
    AssemblyReport, CitizenGraph, FilterSelection, ForceModel, GraphView, InteractionEffect,
    InteractionMachine, LoadMessage, LoadTracker, LoadedSources, NodeKind, RelationType,
    SearchHit, SearchIndex, assemble_with_report, spawn_source_loads,
};

mod graph;
mod physics;
mod render_utils;
mod ui;

pub struct CitizenGraphApp {
    data_dir: PathBuf,
    initial_selection: FilterSelection,
    tracker: LoadTracker,
    load_tx: Sender<LoadMessage>,
    load_rx: Receiver<LoadMessage>,
    state: AppState,
}

enum AppState {
    Loading,
    Ready(Box<ViewModel>),
    Error(Vec<SourceFailure>),
}

struct ViewModel {
    graph: CitizenGraph,
    report: AssemblyReport,
    failures: Vec<SourceFailure>,
    selection: FilterSelection,
    view: GraphView,
    forces: ForceModel,
    search_index: SearchIndex,
    interaction: InteractionMachine,
    pending_effects: Vec<InteractionEffect>,
    details: Option<String>,
    search: String,
    search_hits: Vec<SearchHit>,
    pan: Vec2,
    zoom: f32,
    camera: Option<graph::CameraMove>,
    live_physics: bool,
    physics_intensity: f32,
    physics_repulsion: f32,
    physics_spring: f32,
    physics_collision: f32,
    physics_radial: f32,
    physics_velocity_damping: f32,
    show_quadtree_overlay: bool,
    graph_dirty: bool,
    graph_cache: Option<RenderGraph>,
    visible_node_count: usize,
    visible_edge_count: usize,
}

// Screen-side mirror of the visible graph. Node and edge order match the view, so
// edge `i` is link `i` of the visible link list.
struct RenderGraph {
    nodes: Vec<RenderNode>,
    edges: Vec<RenderEdge>,
    collision_radius: f32,
    physics_scratch: PhysicsScratch,
    view_scratch: ViewScratch,
}

#[derive(Default)]
struct PhysicsScratch {
    forces: Vec<Vec2>,
    positions: Vec<Vec2>,
    charges: Vec<f32>,
}

#[derive(Default)]
struct ViewScratch {
    screen_positions: Vec<Pos2>,
    screen_radii: Vec<f32>,
    visible_indices: Vec<usize>,
    visible_mask: Vec<bool>,
    quadtree_positions: Vec<Vec2>,
    quadtree_charges: Vec<f32>,
    quadtree_cells: Vec<physics::QuadtreeCell>,
}

struct RenderNode {
    id: String,
    kind: NodeKind,
    label: String,
    world_pos: Vec2,
    velocity: Vec2,
    base_radius: f32,
    charge: f32,
    radial_pull: f32,
}

struct RenderEdge {
    source: usize,
    target: usize,
    relation: RelationType,
    distance: f32,
}

#[derive(Clone, Copy)]
struct PhysicsConfig {
    intensity: f32,
    repulsion_scale: f32,
    spring_scale: f32,
    collision_scale: f32,
    radial_scale: f32,
    velocity_damping: f32,
    delta_seconds: f32,
}

impl CitizenGraphApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        data_dir: PathBuf,
        initial_selection: FilterSelection,
    ) -> Self {
        let (load_tx, load_rx) = mpsc::channel();
        let mut app = Self {
            data_dir,
            initial_selection,
            tracker: LoadTracker::new(),
            load_tx,
            load_rx,
            state: AppState::Loading,
        };
        app.start_load();
        app
    }

    fn start_load(&mut self) {
        let generation = self.tracker.begin();
        spawn_source_loads(&self.data_dir, generation, &self.load_tx);
    }

    fn drain_loads(&mut self) -> Option<LoadedSources> {
        let mut completed = None;
        while let Ok(message) = self.load_rx.try_recv() {
            if let Some(loaded) = self.tracker.accept(message) {
                completed = Some(loaded);
            }
        }
        completed
    }

    fn finish_load(&mut self, loaded: LoadedSources) -> AppState {
        if loaded.failures.len() == crate::citizens::source::SourceKind::ALL.len() {
            warn!(data_dir = %self.data_dir.display(), "no citizen source could be loaded");
            return AppState::Error(loaded.failures);
        }

        let (graph, report) = assemble_with_report(&loaded.sources);
        info!(
            generation = loaded.generation,
            citizens = report.citizens,
            nodes = graph.node_count(),
            links = graph.link_count(),
            failed_sources = loaded.failures.len(),
            "citizen graph ready"
        );

        let selection = match &self.state {
            AppState::Ready(model) => model.selection.clone(),
            _ => self.initial_selection.clone(),
        };
        AppState::Ready(Box::new(ViewModel::new(
            graph,
            report,
            loaded.failures,
            selection,
        )))
    }
}

impl eframe::App for CitizenGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        if let Some(loaded) = self.drain_loads() {
            self.state = self.finish_load(loaded);
        }
        if self.tracker.is_loading() {
            ctx.request_repaint();
        }

        let mut reload_requested = false;
        match &mut self.state {
            AppState::Loading => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading citizen datasets...");
                        ui.small(format!("load #{}", self.tracker.generation()));
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(failures) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load any citizen dataset");
                    ui.add_space(6.0);
                    ui.label(format!("data directory: {}", self.data_dir.display()));
                    for failure in failures.iter() {
                        ui.label(format!("{}: {}", failure.kind.label(), failure.message));
                    }
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        reload_requested = true;
                    }
                });
            }
            AppState::Ready(model) => {
                let is_loading = self.tracker.is_loading();
                model.show(ctx, &self.data_dir, &mut reload_requested, is_loading);
            }
        }

        if reload_requested && !self.tracker.is_loading() {
            if matches!(self.state, AppState::Error(_)) {
                self.state = AppState::Loading;
            }
            self.start_load();
        }
    }
}
