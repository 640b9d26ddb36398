use std::collections::HashMap;

use eframe::egui::{Vec2, vec2};
use tracing::debug;

use crate::citizens::{ForceModel, GraphView, SearchIndex};
use crate::util::stable_pair;

use super::super::{PhysicsScratch, RenderEdge, RenderGraph, RenderNode, ViewModel, ViewScratch};

fn seed_position(id: &str, index: usize, spread: f32) -> Vec2 {
    let (jx, jy) = stable_pair(id);
    let mut direction = vec2(jx, jy);
    if direction.length_sq() <= 0.0001 {
        let angle = ((index as f32) * 0.618_034 + 0.11) * std::f32::consts::TAU;
        direction = vec2(angle.cos(), angle.sin());
    }
    direction * spread
}

impl ViewModel {
    pub(in crate::app) fn rebuild_view(&mut self) {
        self.view = GraphView::build(&self.graph, &self.selection);
        self.forces = ForceModel::for_view(&self.view);
        self.search_index = SearchIndex::build(&self.view);
        self.search_hits = self.search_index.search(&self.search);

        let effects = self.interaction.refresh(&self.view);
        self.pending_effects.extend(effects);

        self.rebuild_render_graph();
        self.graph_dirty = false;
    }

    fn rebuild_render_graph(&mut self) {
        let graph = self.view.graph();
        let index = self.view.index();
        let forces = self.forces;
        let spread = (graph.node_count() as f32).sqrt() * 24.0 + 40.0;

        let mut prior_nodes = self
            .graph_cache
            .take()
            .map(|cache| {
                cache
                    .nodes
                    .into_iter()
                    .map(|node| (node.id.clone(), node))
                    .collect::<HashMap<_, _>>()
            })
            .unwrap_or_default();

        let mut reused = 0usize;
        let nodes = graph
            .nodes()
            .iter()
            .enumerate()
            .map(|(position, node)| {
                let degree = index.degree(&node.id);
                let base_radius = forces.node_radius(node.kind, degree);
                let charge = forces.repulsion(degree);
                let radial_pull = forces.radial_pull(degree);

                if let Some(mut prior) = prior_nodes.remove(&node.id) {
                    reused += 1;
                    prior.base_radius = base_radius;
                    prior.charge = charge;
                    prior.radial_pull = radial_pull;
                    return prior;
                }

                RenderNode {
                    id: node.id.clone(),
                    kind: node.kind,
                    label: Self::display_name(node),
                    world_pos: seed_position(&node.id, position, spread),
                    velocity: Vec2::ZERO,
                    base_radius,
                    charge,
                    radial_pull,
                }
            })
            .collect::<Vec<_>>();

        let edges = graph
            .links()
            .iter()
            .filter_map(|link| {
                let source = graph.node_index(&link.source)?;
                let target = graph.node_index(&link.target)?;
                Some(RenderEdge {
                    source,
                    target,
                    relation: link.relation,
                    distance: forces.link_distance(
                        index.degree(&link.source),
                        index.degree(&link.target),
                    ),
                })
            })
            .collect::<Vec<_>>();

        debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            kept_positions = reused,
            max_degree = forces.max_degree(),
            "rebuilt render graph"
        );

        self.visible_node_count = nodes.len();
        self.visible_edge_count = edges.len();
        self.graph_cache = Some(RenderGraph {
            nodes,
            edges,
            collision_radius: forces.collision_radius(),
            physics_scratch: PhysicsScratch::default(),
            view_scratch: ViewScratch::default(),
        });
    }
}
