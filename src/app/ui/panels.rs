use std::path::Path;

use eframe::egui::{self, Align, Context, Layout, Vec2, ViewportCommand};
use tracing::debug;

use crate::citizens::source::SourceFailure;
use crate::citizens::{
    AssemblyReport, CitizenGraph, FilterSelection, ForceModel, GraphView, InteractionEffect,
    InteractionMachine, SearchIndex,
};

use super::super::graph::CameraMove;
use super::super::ViewModel;

const WINDOW_TITLE: &str = "citizen-graph";

impl ViewModel {
    pub(in crate::app) fn new(
        graph: CitizenGraph,
        report: AssemblyReport,
        failures: Vec<SourceFailure>,
        selection: FilterSelection,
    ) -> Self {
        let view = GraphView::build(&graph, &selection);
        let forces = ForceModel::for_view(&view);
        let search_index = SearchIndex::build(&view);

        Self {
            graph,
            report,
            failures,
            selection,
            view,
            forces,
            search_index,
            interaction: InteractionMachine::new(),
            pending_effects: Vec::new(),
            details: None,
            search: String::new(),
            search_hits: Vec::new(),
            pan: Vec2::ZERO,
            zoom: 1.0,
            camera: None,
            live_physics: true,
            physics_intensity: 1.0,
            physics_repulsion: 1.0,
            physics_spring: 1.0,
            physics_collision: 1.0,
            physics_radial: 1.0,
            physics_velocity_damping: 0.9,
            show_quadtree_overlay: false,
            graph_dirty: true,
            graph_cache: None,
            visible_node_count: 0,
            visible_edge_count: 0,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        data_dir: &Path,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        if self.graph_dirty {
            self.rebuild_view();
        }

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("citizen-graph");
                    ui.separator();
                    ui.label(format!("data: {}", data_dir.display()));
                    ui.label(format!("citizens: {}", self.report.citizens));
                    ui.label(format!("links: {}", self.graph.link_count()));
                    if !self.failures.is_empty() {
                        let details = self
                            .failures
                            .iter()
                            .map(|failure| format!("{}: {}", failure.kind.label(), failure.message))
                            .collect::<Vec<_>>()
                            .join("\n");
                        ui.colored_label(
                            egui::Color32::from_rgb(241, 146, 94),
                            format!("{} sources failed", self.failures.len()),
                        )
                        .on_hover_text(details);
                    }
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload data"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    if is_loading {
                        ui.spinner();
                    }
                    let highlight = self.interaction.highlight();
                    if !highlight.is_empty() {
                        ui.separator();
                        ui.label(format!(
                            "highlighted: {} nodes / {} links",
                            highlight.node_count(),
                            highlight.link_count()
                        ));
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(format!(
                            "on screen: {} nodes / {} links  (visible graph {} / {})",
                            self.visible_node_count,
                            self.visible_edge_count,
                            self.view.graph().node_count(),
                            self.view.graph().link_count(),
                        ));
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .id_salt("controls_scroll")
                    .show(ui, |ui| self.draw_controls(ui));
            });

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui));

        if self.graph_dirty {
            ctx.request_repaint();
        }
        self.apply_effects(ctx);
    }

    pub(in crate::app) fn apply_effects(&mut self, ctx: &Context) {
        for effect in std::mem::take(&mut self.pending_effects) {
            debug!(?effect, state = ?self.interaction.state(), "applying interaction effect");
            match effect {
                InteractionEffect::OpenDetails(id) => {
                    self.details = Some(id);
                    self.search.clear();
                    self.search_hits.clear();
                }
                InteractionEffect::CloseDetails => self.details = None,
                InteractionEffect::UpdateLocation(id) => {
                    let label = self
                        .view
                        .graph()
                        .node(&id)
                        .map_or(id.clone(), Self::display_name);
                    ctx.send_viewport_cmd(ViewportCommand::Title(format!(
                        "{WINDOW_TITLE} | {label}"
                    )));
                }
                InteractionEffect::ClearLocation => {
                    ctx.send_viewport_cmd(ViewportCommand::Title(WINDOW_TITLE.to_owned()));
                }
                InteractionEffect::FocusCamera(id) => {
                    let target = self.graph_cache.as_ref().and_then(|cache| {
                        cache
                            .nodes
                            .iter()
                            .find(|node| node.id == id)
                            .map(|node| node.world_pos)
                    });
                    if let Some(target) = target {
                        self.camera = Some(CameraMove::new(target, self.pan, self.zoom));
                        ctx.request_repaint();
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::citizens::assemble_with_report;
    use crate::citizens::records::CitizenRecord;
    use crate::citizens::source::SourceSet;

    fn model() -> ViewModel {
        let citizen = |id: &str, ens: Option<&str>| CitizenRecord {
            id: id.to_owned(),
            ens: ens.map(str::to_owned),
            ..Default::default()
        };
        let (graph, report) = assemble_with_report(&SourceSet {
            citizens: Some(vec![citizen("0xAA", Some("a.eth")), citizen("0xBB", None)]),
            ..Default::default()
        });
        let mut model = ViewModel::new(graph, report, Vec::new(), FilterSelection::default());
        model.rebuild_view();
        model
    }

    #[test]
    fn opening_details_resets_the_search() {
        let mut model = model();
        model.search = "0x".to_owned();
        model.search_hits = model.search_index.search(&model.search);
        assert_eq!(model.search_hits.len(), 2);

        let effects = model.interaction.click_node(&model.view, "0xbb");
        model.pending_effects.extend(effects);
        model.apply_effects(&Context::default());

        assert_eq!(model.details.as_deref(), Some("0xbb"));
        assert!(model.search.is_empty());
        assert!(model.search_hits.is_empty());
    }

    #[test]
    fn picking_a_result_fills_the_search_box() {
        let mut model = model();
        model.search = "a.e".to_owned();

        model.pick_search_result("0xaa");
        assert_eq!(model.search, "a.eth");
        assert_eq!(
            model.pending_effects,
            vec![InteractionEffect::FocusCamera("0xaa".to_owned())]
        );

        model.pick_search_result("0xbb");
        assert_eq!(model.search, "0xbb");
        assert!(model.details.is_none());
    }
}
