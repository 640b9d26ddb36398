use eframe::egui::{self, Align2, Color32, FontId, Sense, Stroke, Ui, vec2};

use crate::citizens::NodeKind;

use super::interaction::hovered_edge_index;
use super::super::physics::{quadtree_cells, step_physics};
use super::super::render_utils::{
    blend_color, dim_color, draw_background, edge_visible, node_color, relation_color,
    world_to_screen,
};
use super::super::{PhysicsConfig, RenderGraph, ViewModel};

impl ViewModel {
    fn update_screen_space(rect: egui::Rect, pan: egui::Vec2, zoom: f32, cache: &mut RenderGraph) {
        let scratch = &mut cache.view_scratch;
        scratch.screen_positions.clear();
        scratch.screen_radii.clear();
        for render_node in &cache.nodes {
            scratch
                .screen_positions
                .push(world_to_screen(rect, pan, zoom, render_node.world_pos));
            scratch
                .screen_radii
                .push((render_node.base_radius * zoom.powf(0.5)).clamp(2.0, 40.0));
        }
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        if self.graph_dirty {
            self.rebuild_view();
        }

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        let frame_delta_seconds = ui
            .ctx()
            .input(|input| input.stable_dt)
            .clamp(1.0 / 240.0, 1.0 / 20.0);

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);
        let camera_moving = self.advance_camera(frame_delta_seconds);

        draw_background(&painter, rect, self.pan, self.zoom);

        let pan = self.pan;
        let zoom = self.zoom;
        let physics = PhysicsConfig {
            intensity: self.physics_intensity,
            repulsion_scale: self.physics_repulsion,
            spring_scale: self.physics_spring,
            collision_scale: self.physics_collision,
            radial_scale: self.physics_radial,
            velocity_damping: self.physics_velocity_damping,
            delta_seconds: frame_delta_seconds,
        };

        let Some(cache) = self.graph_cache.as_mut() else {
            ui.label("Nothing to draw yet.");
            return;
        };
        if cache.nodes.is_empty() {
            self.visible_node_count = 0;
            self.visible_edge_count = 0;
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No nodes match the selected node kinds and relations.",
                FontId::proportional(14.0),
                Color32::from_gray(200),
            );
            return;
        }

        let mut physics_moving = false;
        if self.live_physics {
            physics_moving = step_physics(cache, physics);
        }
        if physics_moving || camera_moving || response.dragged() {
            ui.ctx().request_repaint();
        }

        Self::update_screen_space(rect, pan, zoom, cache);
        let scratch = &mut cache.view_scratch;
        Self::visible_indices_into(
            rect,
            &scratch.screen_positions,
            &scratch.screen_radii,
            &mut scratch.visible_indices,
        );
        scratch.visible_mask.clear();
        scratch.visible_mask.resize(cache.nodes.len(), false);
        for &index in &scratch.visible_indices {
            scratch.visible_mask[index] = true;
        }
        self.visible_node_count = scratch.visible_indices.len();

        if self.show_quadtree_overlay {
            quadtree_cells(
                &cache.nodes,
                &mut scratch.quadtree_positions,
                &mut scratch.quadtree_charges,
                &mut scratch.quadtree_cells,
            );
            for cell in &scratch.quadtree_cells {
                let min = world_to_screen(rect, pan, zoom, cell.center - vec2(cell.half_extent, cell.half_extent));
                let max = world_to_screen(rect, pan, zoom, cell.center + vec2(cell.half_extent, cell.half_extent));
                let alpha = if cell.is_leaf { 110 } else { 55 };
                let line_width = (1.4_f32 - (cell.depth as f32 * 0.09)).clamp(0.45, 1.4);
                painter.rect_stroke(
                    egui::Rect::from_min_max(min, max),
                    0.0,
                    Stroke::new(line_width, Color32::from_rgba_unmultiplied(106, 198, 255, alpha)),
                    egui::StrokeKind::Middle,
                );
            }
        }

        let hovered = Self::hovered_index(
            ui,
            &scratch.visible_indices,
            &scratch.screen_positions,
            &scratch.screen_radii,
        );
        if hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        let hovered_link = if hovered.is_none() && response.hovered() {
            hovered_edge_index(
                ui,
                &cache.edges,
                &scratch.screen_positions,
                &scratch.visible_mask,
            )
        } else {
            None
        };

        // Feed pointer events into the state machine before reading its highlight.
        let hovered_id = hovered.map(|(index, _)| cache.nodes[index].id.clone());
        match (&hovered_id, hovered_link) {
            (Some(id), _) => self.interaction.pointer_enter(&self.view, id),
            (None, Some(link)) => self.interaction.pointer_enter_link(&self.view, link),
            (None, None) => self.interaction.pointer_leave(&self.view),
        }
        if response.clicked_by(egui::PointerButton::Primary) {
            let effects = match &hovered_id {
                Some(id) => self.interaction.click_node(&self.view, id),
                None => self.interaction.click_background(&self.view),
            };
            self.pending_effects.extend(effects);
        }

        let highlight = self.interaction.highlight();
        let highlight_active = !highlight.is_empty();
        let selected = self.interaction.selected();
        let zoom_sqrt = zoom.sqrt();

        let mut visible_edge_count = 0usize;
        for (edge_index, edge) in cache.edges.iter().enumerate() {
            let start = scratch.screen_positions[edge.source];
            let end = scratch.screen_positions[edge.target];
            if !scratch.visible_mask[edge.source]
                && !scratch.visible_mask[edge.target]
                && !edge_visible(rect, start, end, 2.5)
            {
                continue;
            }

            let base = relation_color(edge.relation);
            let (line_width, line_color) = if highlight.contains_link(edge_index) {
                ((2.4 * zoom_sqrt).clamp(1.2, 4.4), base)
            } else if highlight_active {
                ((0.7 * zoom_sqrt).clamp(0.4, 1.6), dim_color(base, 0.22))
            } else {
                ((1.0 * zoom_sqrt).clamp(0.5, 2.6), dim_color(base, 0.72))
            };

            painter.line_segment([start, end], Stroke::new(line_width, line_color));
            visible_edge_count += 1;
        }
        self.visible_edge_count = visible_edge_count;

        let selected_color = Color32::from_rgb(245, 206, 93);
        let mut selection_animating = false;

        for &index in &scratch.visible_indices {
            let render_node = &cache.nodes[index];
            let position = scratch.screen_positions[index];
            let radius = scratch.screen_radii[index];

            let is_selected = selected == Some(render_node.id.as_str());
            let is_hovered = hovered.is_some_and(|(hovered, _)| hovered == index);
            let is_related = highlight.contains_node(&render_node.id);

            let base_color = node_color(render_node.kind);
            let unselected_color = if is_hovered {
                blend_color(base_color, Color32::WHITE, 0.45)
            } else if is_related {
                base_color
            } else if highlight_active {
                dim_color(base_color, 0.35)
            } else {
                dim_color(base_color, 0.85)
            };

            let selection_mix = ui.ctx().animate_bool(
                ui.make_persistent_id(("node-selection", render_node.id.as_str())),
                is_selected,
            );
            if selection_mix > 0.0 && selection_mix < 1.0 {
                selection_animating = true;
            }

            painter.circle_filled(
                position,
                radius,
                blend_color(unselected_color, selected_color, selection_mix),
            );
            if matches!(render_node.kind, NodeKind::Category(_)) {
                painter.circle_stroke(position, radius + 2.5, Stroke::new(1.2, base_color));
            }
            if selection_mix > 0.0 {
                let halo_strength = (selection_mix * (1.0 - selection_mix) * 4.0).clamp(0.0, 1.0);
                let halo_alpha = (30.0 + (halo_strength * 145.0)) as u8;
                painter.circle_stroke(
                    position,
                    radius + 4.0 + ((1.0 - selection_mix) * 6.0),
                    Stroke::new(
                        1.0 + (halo_strength * 1.6),
                        Color32::from_rgba_unmultiplied(245, 206, 93, halo_alpha),
                    ),
                );
            }

            let should_draw_label = is_selected
                || is_hovered
                || (is_related && zoom > 0.4)
                || matches!(render_node.kind, NodeKind::Category(_))
                || zoom > 1.6;
            if should_draw_label {
                painter.text(
                    position + vec2(radius + 5.0, 0.0),
                    Align2::LEFT_CENTER,
                    render_node.label.as_str(),
                    FontId::proportional(12.0),
                    Color32::from_gray(238),
                );
            }
        }

        if selection_animating {
            ui.ctx().request_repaint();
        }

        if let Some(link) = hovered_link {
            let edge = &cache.edges[link];
            let panel_text = format!(
                "{}  |  {} -> {}",
                edge.relation.label(),
                cache.nodes[edge.source].label,
                cache.nodes[edge.target].label,
            );
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                panel_text,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        if let Some((hovered_index, _)) = hovered {
            let render_node = &cache.nodes[hovered_index];
            let panel_text = format!(
                "{}  |  {}  |  degree {}",
                render_node.label,
                render_node.kind.label(),
                self.view.degree(&render_node.id)
            );
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                panel_text,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }
    }
}
