//! Boundary outline construction.
//!
//! All paths are clockwise in screen space (y grows downward) and start from a fixed point, so
//! arc-length position 0 refers to the same spot on every frame.

use crate::core::{BezPath, Rect};

/// Cubic handle length for a quarter circle of radius 1.
const QUARTER_ARC_K: f64 = 0.552_284_749_830_793_4;

/// Shrink `bounds` by half the stroke width on every side so a stroke centered on the
/// boundary stays inside the surface.
///
/// Insets that would invert the rectangle collapse it to a zero-size rect at its center.
pub fn inset_bounds(bounds: Rect, thickness_px: f64) -> Rect {
    let half = (thickness_px / 2.0).max(0.0);
    let r = bounds.abs().inset(-half);
    if r.width() >= 0.0 && r.height() >= 0.0 {
        return r;
    }
    let c = bounds.center();
    Rect::new(
        if r.width() < 0.0 { c.x } else { r.x0 },
        if r.height() < 0.0 { c.y } else { r.y0 },
        if r.width() < 0.0 { c.x } else { r.x1 },
        if r.height() < 0.0 { c.y } else { r.y1 },
    )
}

/// Build the closed border outline for `rect`.
///
/// `corner_radius <= 0` gives a sharp rectangle starting at the top-left corner. Positive radii
/// give a rounded rectangle starting where the bottom-left arc meets the left edge, running up
/// that edge first; radii larger than half the shorter side are clamped to it.
pub fn boundary_path(rect: Rect, corner_radius: f64) -> BezPath {
    let rect = rect.abs();
    let max_radius = rect.width().min(rect.height()) / 2.0;
    let radius = if corner_radius.is_finite() {
        corner_radius.min(max_radius)
    } else {
        0.0
    };

    if radius <= 0.0 {
        sharp_rect(rect)
    } else {
        rounded_rect(rect, radius)
    }
}

fn sharp_rect(r: Rect) -> BezPath {
    let mut p = BezPath::new();
    p.move_to((r.x0, r.y0));
    p.line_to((r.x1, r.y0));
    p.line_to((r.x1, r.y1));
    p.line_to((r.x0, r.y1));
    p.close_path();
    p
}

fn rounded_rect(r: Rect, radius: f64) -> BezPath {
    let k = radius * QUARTER_ARC_K;
    let mut p = BezPath::new();

    // Starts at the bottom of the left edge and runs up it first.
    p.move_to((r.x0, r.y1 - radius));
    p.line_to((r.x0, r.y0 + radius));
    p.curve_to(
        (r.x0, r.y0 + radius - k),
        (r.x0 + radius - k, r.y0),
        (r.x0 + radius, r.y0),
    );
    // Top edge, top-right corner.
    p.line_to((r.x1 - radius, r.y0));
    p.curve_to(
        (r.x1 - radius + k, r.y0),
        (r.x1, r.y0 + radius - k),
        (r.x1, r.y0 + radius),
    );
    // Right edge, bottom-right corner.
    p.line_to((r.x1, r.y1 - radius));
    p.curve_to(
        (r.x1, r.y1 - radius + k),
        (r.x1 - radius + k, r.y1),
        (r.x1 - radius, r.y1),
    );
    // Bottom edge, bottom-left corner back to the start.
    p.line_to((r.x0 + radius, r.y1));
    p.curve_to(
        (r.x0 + radius - k, r.y1),
        (r.x0, r.y1 - radius + k),
        (r.x0, r.y1 - radius),
    );
    p.close_path();
    p
}
