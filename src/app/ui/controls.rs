use std::ops::RangeInclusive;

use eframe::egui::{self, Key, Response, RichText, Ui};

use crate::citizens::{CategoryKind, NodeKind, RelationType};

use super::super::ViewModel;
use super::super::render_utils::relation_color;

const SLIDER_KEY_BASE_RATE: f32 = 10.0;
const SLIDER_KEY_ACCEL_PER_SEC: f32 = 9.0;
const SLIDER_KEY_ACCEL_MAX: f32 = 40.0;
const MAX_SEARCH_ROWS: usize = 50;

#[derive(Clone, Copy, Default)]
struct SliderKeyHoldState {
    positive_secs: f32,
    negative_secs: f32,
}

fn slider_key_accel_multiplier(hold_secs: f32) -> f32 {
    let ramp = hold_secs * SLIDER_KEY_ACCEL_PER_SEC;
    (1.0 + ramp + ramp * ramp * 0.15).min(SLIDER_KEY_ACCEL_MAX)
}

fn apply_slider_arrow_acceleration(
    ui: &Ui,
    response: &Response,
    value: &mut f32,
    range: RangeInclusive<f32>,
) -> bool {
    let (min, max) = (*range.start(), *range.end());
    let step = ((max - min) / 200.0).max(0.0005);
    let state_id = response.id.with("arrow_key_hold_state");
    let mut hold_state = ui.ctx().data(|data| {
        data.get_temp::<SliderKeyHoldState>(state_id)
            .unwrap_or_default()
    });

    if !response.has_focus() {
        ui.ctx()
            .data_mut(|data| data.insert_temp(state_id, SliderKeyHoldState::default()));
        return false;
    }

    let (delta_time, increase_down, decrease_down) = ui.input(|input| {
        (
            input.stable_dt.min(0.1),
            input.key_down(Key::ArrowRight) || input.key_down(Key::ArrowUp),
            input.key_down(Key::ArrowLeft) || input.key_down(Key::ArrowDown),
        )
    });

    hold_state.positive_secs = if increase_down {
        hold_state.positive_secs + delta_time
    } else {
        0.0
    };
    hold_state.negative_secs = if decrease_down {
        hold_state.negative_secs + delta_time
    } else {
        0.0
    };
    ui.ctx()
        .data_mut(|data| data.insert_temp(state_id, hold_state));

    let direction = (increase_down as i8) - (decrease_down as i8);
    if direction == 0 {
        return false;
    }

    let hold_secs = if direction > 0 {
        hold_state.positive_secs
    } else {
        hold_state.negative_secs
    };
    let speed = SLIDER_KEY_BASE_RATE * slider_key_accel_multiplier(hold_secs);
    let old_value = *value;
    *value = (*value + direction as f32 * step * speed * delta_time).clamp(min, max);
    ui.ctx().request_repaint();
    (*value - old_value).abs() > f32::EPSILON
}

fn physics_slider(
    ui: &mut Ui,
    value: &mut f32,
    range: RangeInclusive<f32>,
    text: &str,
    hover: &str,
) {
    let slider = ui
        .add(
            egui::Slider::new(&mut *value, range.clone())
                .text(text)
                .clamping(egui::SliderClamping::Always),
        )
        .on_hover_text(hover);
    if slider.hovered() {
        slider.request_focus();
    }
    apply_slider_arrow_acceleration(ui, &slider, value, range);
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Graph Controls");
        ui.separator();
        ui.add_space(4.0);

        self.draw_search(ui);
        ui.separator();

        let mut changed = false;

        ui.label(RichText::new("Node kinds").strong());
        let kinds = std::iter::once(NodeKind::Citizen)
            .chain(CategoryKind::ALL.into_iter().map(NodeKind::Category));
        for kind in kinds {
            let mut selected = self.selection.is_kind_selected(kind);
            let (label, hover) = match kind {
                NodeKind::Citizen => (kind.label().to_owned(), "Show citizen nodes."),
                NodeKind::Category(_) => (
                    format!("{} hub", kind.label()),
                    "Keep this hub visible even when its relation is hidden.",
                ),
            };
            if ui
                .checkbox(&mut selected, label)
                .on_hover_text(hover)
                .changed()
            {
                self.selection.set_kind(kind, selected);
                changed = true;
            }
        }

        ui.add_space(6.0);
        ui.label(RichText::new("Relations").strong());
        for relation in RelationType::ALL {
            let mut selected = self.selection.is_relation_selected(relation);
            ui.horizontal(|ui| {
                let (swatch, _) =
                    ui.allocate_exact_size(egui::vec2(10.0, 10.0), egui::Sense::hover());
                ui.painter()
                    .circle_filled(swatch.center(), 5.0, relation_color(relation));
                let hover = match relation.category() {
                    Some(category) => format!(
                        "{}: links citizens to the {} hub.",
                        relation.key(),
                        NodeKind::Category(category).label()
                    ),
                    None => format!("{}: links citizens to each other.", relation.key()),
                };
                if ui
                    .checkbox(&mut selected, relation.label())
                    .on_hover_text(hover)
                    .changed()
                {
                    self.selection.set_relation(relation, selected);
                    changed = true;
                }
            });
        }

        if changed {
            self.graph_dirty = true;
        }

        ui.separator();

        ui.checkbox(&mut self.live_physics, "Live physics simulation")
            .on_hover_text("Continuously simulate layout forces while viewing the graph.");
        ui.checkbox(&mut self.show_quadtree_overlay, "Show quadtree overlay")
            .on_hover_text("Draw the active Barnes-Hut partitions over the graph canvas.");

        ui.collapsing("Physics tuning", |ui| {
            physics_slider(
                ui,
                &mut self.physics_intensity,
                0.2..=2.5,
                "Intensity",
                "Overall strength applied to all physics forces.",
            );
            physics_slider(
                ui,
                &mut self.physics_repulsion,
                0.25..=2.6,
                "Repulsion",
                "Scales the degree-weighted charge between nodes.",
            );
            physics_slider(
                ui,
                &mut self.physics_spring,
                0.2..=2.2,
                "Link spring",
                "How strongly linked nodes pull toward their preferred distance.",
            );
            physics_slider(
                ui,
                &mut self.physics_collision,
                0.2..=2.0,
                "Collision",
                "Separation force keeping nodes from overlapping.",
            );
            physics_slider(
                ui,
                &mut self.physics_radial,
                0.0..=3.0,
                "Radial pull",
                "Scales the pull that keeps isolated nodes near the centre.",
            );
            physics_slider(
                ui,
                &mut self.physics_velocity_damping,
                0.78..=0.97,
                "Velocity damping",
                "How quickly node movement slows each frame.",
            );
        });
    }

    fn draw_search(&mut self, ui: &mut Ui) {
        ui.label(format!(
            "Search {} citizens (address, ENS or handle)",
            self.search_index.len()
        ));
        let response = ui
            .text_edit_singleline(&mut self.search)
            .on_hover_text("Case and whitespace are ignored. Pick a result to fly to it.");
        if response.changed() {
            self.search_hits = self.search_index.search(&self.search);
        }

        if self.search.trim().is_empty() {
            return;
        }
        if self.search_hits.is_empty() {
            ui.small("No visible citizen matches.");
            return;
        }

        ui.small(format!("{} matches", self.search_hits.len()));
        let mut picked = None;
        egui::ScrollArea::vertical()
            .id_salt("search_results_scroll")
            .max_height(220.0)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for hit in self.search_hits.iter().take(MAX_SEARCH_ROWS) {
                    if ui
                        .link(hit.label.as_str())
                        .on_hover_text(hit.id.as_str())
                        .clicked()
                    {
                        picked = Some(hit.id.clone());
                    }
                }
            });

        if let Some(id) = picked {
            self.pick_search_result(&id);
        }
    }

    pub(in crate::app) fn pick_search_result(&mut self, id: &str) {
        let effects = self.interaction.select_search_result(&self.view, id);
        if effects.is_empty() {
            return;
        }
        if let Some(node) = self.view.graph().node(id) {
            self.search = node.alias().unwrap_or(node.id.as_str()).to_owned();
            self.search_hits = self.search_index.search(&self.search);
        }
        self.pending_effects.extend(effects);
    }
}
