use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

use crate::graph::organization_color;

pub(super) fn organization_color32(index: usize) -> Color32 {
    let (r, g, b) = organization_color(index);
    Color32::from_rgb(r, g, b)
}

/// Scale a color's alpha by an opacity in [0, 1]; the hover fade is an
/// opacity change, not a color change.
pub(super) fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    let opacity = opacity.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        color.r(),
        color.g(),
        color.b(),
        (color.a() as f32 * opacity) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        color.a(),
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::WHITE);

    let step = (56.0 * zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.center() + pan;
    let grid = Stroke::new(1.0, Color32::from_rgba_unmultiplied(0, 0, 0, 10));

    let mut x = origin.x.rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], grid);
        x += step;
    }

    let mut y = origin.y.rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], grid);
        y += step;
    }
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

/// Distance from a point to the closed segment [a, b].
pub(super) fn point_segment_distance(point: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let length_sq = ab.length_sq();
    if length_sq <= f32::EPSILON {
        return a.distance(point);
    }
    let t = ((point - a).dot(ab) / length_sq).clamp(0.0, 1.0);
    (a + ab * t).distance(point)
}
