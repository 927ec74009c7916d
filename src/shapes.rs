use crate::core::{BezPath, Point, Rect};

/// Build a closed clockwise path tracing `rect` with quarter-circle corners.
///
/// The path starts at top-left + radius and uses one quadratic segment per
/// corner. The caller fills or strokes it. `radius` is clamped to
/// `min(width, height) / 2`, so an oversized radius degenerates to a capsule
/// rather than self-intersecting; `radius = 0` yields a plain rectangle.
pub fn rounded_rect_path(rect: Rect, radius: f64) -> BezPath {
    let (x0, y0, x1, y1) = (rect.x0, rect.y0, rect.x1, rect.y1);
    let r = radius
        .max(0.0)
        .min(rect.width().abs() / 2.0)
        .min(rect.height().abs() / 2.0);

    let mut path = BezPath::new();
    path.move_to(Point::new(x0 + r, y0));
    path.line_to(Point::new(x1 - r, y0));
    if r > 0.0 {
        path.quad_to(Point::new(x1, y0), Point::new(x1, y0 + r));
    }
    path.line_to(Point::new(x1, y1 - r));
    if r > 0.0 {
        path.quad_to(Point::new(x1, y1), Point::new(x1 - r, y1));
    }
    path.line_to(Point::new(x0 + r, y1));
    if r > 0.0 {
        path.quad_to(Point::new(x0, y1), Point::new(x0, y1 - r));
    }
    path.line_to(Point::new(x0, y0 + r));
    if r > 0.0 {
        path.quad_to(Point::new(x0, y0), Point::new(x0 + r, y0));
    }
    path.close_path();
    path
}
