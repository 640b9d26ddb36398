use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

use crate::citizens::{NodeKind, RelationType};

const CANVAS_FILL: Color32 = Color32::from_rgb(19, 23, 29);
const GRID_STROKE: Stroke = Stroke {
    width: 1.0,
    color: Color32::from_rgba_premultiplied(16, 19, 22, 70),
};

fn mix_channel(from: u8, to: u8, amount: f32) -> u8 {
    (f32::from(from) + (f32::from(to) - f32::from(from)) * amount).round() as u8
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let [r, g, b, a] = base.to_srgba_unmultiplied();
    let [or, og, ob, oa] = overlay.to_srgba_unmultiplied();
    Color32::from_rgba_unmultiplied(
        mix_channel(r, or, amount),
        mix_channel(g, og, amount),
        mix_channel(b, ob, amount),
        mix_channel(a, oa, amount),
    )
}

// Darkens toward black and fades alpha down to 45% at factor 0.
pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    let alpha_scale = 0.45 + factor * 0.55;
    Color32::from_rgba_unmultiplied(
        mix_channel(0, r, factor),
        mix_channel(0, g, factor),
        mix_channel(0, b, factor),
        mix_channel(0, a, alpha_scale),
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, CANVAS_FILL);

    let spacing = (56.0 * zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.center() + pan;
    let first = |origin: f32, start: f32| start + (origin - start).rem_euclid(spacing);

    let columns = std::iter::successors(Some(first(origin.x, rect.left())), |x| Some(x + spacing))
        .take_while(|&x| x < rect.right());
    for x in columns {
        painter.vline(x, rect.y_range(), GRID_STROKE);
    }

    let rows = std::iter::successors(Some(first(origin.y, rect.top())), |y| Some(y + spacing))
        .take_while(|&y| y < rect.bottom());
    for y in rows {
        painter.hline(rect.x_range(), y, GRID_STROKE);
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    rect.expand(radius).contains(position)
}

pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    if !Rect::from_two_pos(start, end).expand(padding).intersects(rect) {
        return false;
    }
    if rect.contains(start) || rect.contains(end) {
        return true;
    }

    let corners = [
        rect.left_top(),
        rect.right_top(),
        rect.right_bottom(),
        rect.left_bottom(),
    ];
    (0..corners.len()).any(|side| {
        let next = (side + 1) % corners.len();
        segments_intersect(start, end, corners[side], corners[next])
    })
}

fn orientation(origin: Pos2, a: Pos2, b: Pos2) -> f32 {
    (a - origin).x * (b - origin).y - (a - origin).y * (b - origin).x
}

fn straddles(p: Pos2, q: Pos2, a: Pos2, b: Pos2) -> bool {
    let first = orientation(p, q, a);
    let second = orientation(p, q, b);
    (first <= 0.0 && second >= 0.0) || (first >= 0.0 && second <= 0.0)
}

fn segments_intersect(a1: Pos2, a2: Pos2, b1: Pos2, b2: Pos2) -> bool {
    Rect::from_two_pos(a1, a2).intersects(Rect::from_two_pos(b1, b2))
        && straddles(a1, a2, b1, b2)
        && straddles(b1, b2, a1, a2)
}

pub(super) fn distance_to_segment(point: Pos2, start: Pos2, end: Pos2) -> f32 {
    let along = end - start;
    let length_sq = along.length_sq();
    if length_sq <= f32::EPSILON {
        return point.distance(start);
    }
    let t = ((point - start).dot(along) / length_sq).clamp(0.0, 1.0);
    point.distance(start + along * t)
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

pub(super) fn relation_color(relation: RelationType) -> Color32 {
    match relation {
        RelationType::TokenHolding => Color32::from_rgb(0x79, 0xA4, 0xFF),
        RelationType::ScoreMembership => Color32::from_rgb(0xFF, 0xB9, 0x00),
        RelationType::TrustMembership => Color32::from_rgb(0x6E, 0xE6, 0xB6),
        RelationType::SocialFollow => Color32::from_rgb(0x01, 0xD3, 0xDE),
        RelationType::Referral => Color32::from_rgb(0xFE, 0x5B, 0x00),
        RelationType::PeerTransfer => Color32::from_rgb(0xFF, 0x66, 0xE3),
        RelationType::PoapMembership => Color32::from_rgb(0xC6, 0xCE, 0x01),
    }
}

pub(super) fn node_color(kind: NodeKind) -> Color32 {
    match kind {
        NodeKind::Citizen => Color32::from_rgb(196, 204, 214),
        NodeKind::Category(category) => relation_color(category.relation()),
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;

    #[test]
    fn screen_and_world_round_trip() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0));
        let pan = vec2(25.0, -40.0);
        let world = vec2(120.0, -75.0);

        let screen = world_to_screen(rect, pan, 1.7, world);
        let back = screen_to_world(rect, pan, 1.7, screen);

        assert!((back - world).length() < 0.001);
    }

    #[test]
    fn edge_crossing_viewport_is_visible() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(100.0, 100.0));

        assert!(edge_visible(rect, pos2(-50.0, 50.0), pos2(150.0, 50.0), 0.0));
        assert!(!edge_visible(rect, pos2(-50.0, -50.0), pos2(-10.0, 150.0), 0.0));
        assert!(!circle_visible(rect, pos2(-20.0, 50.0), 5.0));
    }

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let start = pos2(0.0, 0.0);
        let end = pos2(10.0, 0.0);

        assert!((distance_to_segment(pos2(5.0, 3.0), start, end) - 3.0).abs() < 1e-5);
        assert!((distance_to_segment(pos2(14.0, 3.0), start, end) - 5.0).abs() < 1e-5);
        assert!((distance_to_segment(pos2(0.0, 2.0), start, start) - 2.0).abs() < 1e-5);
    }

    #[test]
    fn blending_and_dimming_hit_their_extremes() {
        let base = Color32::from_rgb(200, 100, 50);

        assert_eq!(blend_color(base, Color32::WHITE, 0.0), base);
        assert_eq!(blend_color(base, Color32::WHITE, 1.0), Color32::WHITE);
        assert_eq!(dim_color(base, 1.0), base);
    }

    #[test]
    fn category_nodes_take_their_relation_color() {
        assert_eq!(
            node_color(NodeKind::Category(crate::citizens::CategoryKind::Poap)),
            relation_color(RelationType::PoapMembership)
        );
    }
}
