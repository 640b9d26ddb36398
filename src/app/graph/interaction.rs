use eframe::egui::{self, Pos2, Rect, Ui, Vec2};

use super::super::ViewModel;
use super::super::RenderEdge;
use super::super::render_utils::{circle_visible, distance_to_segment, screen_to_world};

const CAMERA_PHASE_SECS: f32 = 0.3;
const CAMERA_OVERVIEW_ZOOM: f32 = 0.5;
const CAMERA_FOCUS_ZOOM: f32 = 2.0;
const LINK_HOVER_DISTANCE: f32 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CameraPhase {
    ZoomOut,
    Pan,
    ZoomIn,
}

#[derive(Clone, Copy, Debug)]
pub(in crate::app) struct CameraMove {
    target: Vec2,
    phase: CameraPhase,
    elapsed: f32,
    start_pan: Vec2,
    start_zoom: f32,
}

fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

impl CameraMove {
    pub(in crate::app) fn new(target: Vec2, pan: Vec2, zoom: f32) -> Self {
        Self {
            target,
            phase: CameraPhase::ZoomOut,
            elapsed: 0.0,
            start_pan: pan,
            start_zoom: zoom,
        }
    }

    pub(in crate::app) fn advance(&mut self, delta_seconds: f32, pan: &mut Vec2, zoom: &mut f32) -> bool {
        self.elapsed += delta_seconds.max(0.0);
        let t = smoothstep(self.elapsed / CAMERA_PHASE_SECS);

        match self.phase {
            CameraPhase::ZoomOut => {
                let next_zoom = self.start_zoom + (CAMERA_OVERVIEW_ZOOM - self.start_zoom) * t;
                // Keep the screen centre fixed while zooming.
                *pan = self.start_pan * (next_zoom / self.start_zoom.max(0.0001));
                *zoom = next_zoom;
            }
            CameraPhase::Pan => {
                let goal = -self.target * CAMERA_OVERVIEW_ZOOM;
                *pan = self.start_pan + (goal - self.start_pan) * t;
                *zoom = CAMERA_OVERVIEW_ZOOM;
            }
            CameraPhase::ZoomIn => {
                let next_zoom = CAMERA_OVERVIEW_ZOOM + (CAMERA_FOCUS_ZOOM - CAMERA_OVERVIEW_ZOOM) * t;
                *pan = -self.target * next_zoom;
                *zoom = next_zoom;
            }
        }

        if self.elapsed < CAMERA_PHASE_SECS {
            return true;
        }

        self.elapsed = 0.0;
        self.start_pan = *pan;
        self.start_zoom = *zoom;
        match self.phase {
            CameraPhase::ZoomOut => {
                self.phase = CameraPhase::Pan;
                true
            }
            CameraPhase::Pan => {
                self.phase = CameraPhase::ZoomIn;
                true
            }
            CameraPhase::ZoomIn => false,
        }
    }
}

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        self.camera = None;
        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.05, 6.0);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Primary)
            || response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.camera = None;
            self.pan += response.drag_delta();
        }
    }

    pub(in crate::app) fn advance_camera(&mut self, delta_seconds: f32) -> bool {
        let Some(camera) = self.camera.as_mut() else {
            return false;
        };
        let moving = camera.advance(delta_seconds, &mut self.pan, &mut self.zoom);
        if !moving {
            self.camera = None;
        }
        moving
    }

    pub(in crate::app) fn visible_indices_into(
        rect: Rect,
        screen_positions: &[Pos2],
        screen_radii: &[f32],
        visible: &mut Vec<usize>,
    ) {
        visible.clear();
        visible.extend(
            (0..screen_positions.len())
                .filter(|&index| circle_visible(rect, screen_positions[index], screen_radii[index])),
        );
    }

    pub(in crate::app) fn hovered_index(
        ui: &Ui,
        visible_indices: &[usize],
        screen_positions: &[Pos2],
        screen_radii: &[f32],
    ) -> Option<(usize, f32)> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        visible_indices
            .iter()
            .filter_map(|&index| {
                let distance = screen_positions[index].distance(pointer);
                (distance <= screen_radii[index]).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}

// Edges are only hit-tested when at least one endpoint is on screen.
pub(in crate::app) fn hovered_edge_index(
    ui: &Ui,
    edges: &[RenderEdge],
    screen_positions: &[Pos2],
    visible_mask: &[bool],
) -> Option<usize> {
    let pointer = ui.input(|input| input.pointer.hover_pos())?;
    nearest_edge(pointer, edges, screen_positions, visible_mask)
}

fn nearest_edge(
    pointer: Pos2,
    edges: &[RenderEdge],
    screen_positions: &[Pos2],
    visible_mask: &[bool],
) -> Option<usize> {
    edges
        .iter()
        .enumerate()
        .filter(|(_, edge)| visible_mask[edge.source] || visible_mask[edge.target])
        .filter_map(|(index, edge)| {
            let distance = distance_to_segment(
                pointer,
                screen_positions[edge.source],
                screen_positions[edge.target],
            );
            (distance <= LINK_HOVER_DISTANCE).then_some((index, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}
