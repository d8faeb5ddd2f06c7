//! Planar geometry primitives: distances and axis-aligned bounding boxes
//!
//! All functions work on plain Cartesian coordinates. No projection or
//! geodesic math happens here.

use geo::{Coord, Point, Rect};

/// Euclidean distance between two points
#[inline(always)]
pub fn distance(p1: Point<f64>, p2: Point<f64>) -> f64 {
    let dx = p2.x() - p1.x();
    let dy = p2.y() - p1.y();
    (dx * dx + dy * dy).sqrt()
}

/// Distance from `p` to the closest point of the closed segment `[a, b]`
///
/// The projection parameter is clamped to `[0, 1]` so the closest point never
/// leaves the segment. A zero-length segment degrades to point distance.
#[inline]
pub fn point_to_segment_distance(p: Point<f64>, a: Point<f64>, b: Point<f64>) -> f64 {
    let abx = b.x() - a.x();
    let aby = b.y() - a.y();
    let length_sq = abx * abx + aby * aby;
    if length_sq == 0.0 {
        return distance(p, a);
    }

    let t = ((p.x() - a.x()) * abx + (p.y() - a.y()) * aby) / length_sq;
    // Endpoints are measured directly: a + (b - a) need not round back to b
    if t <= 0.0 {
        return distance(p, a);
    }
    if t >= 1.0 {
        return distance(p, b);
    }
    let projection = Point::new(a.x() + t * abx, a.y() + t * aby);

    distance(p, projection)
}

/// Minimum distance from `p` to any segment of the polyline described by `points`
///
/// Returns `f64::INFINITY` when there are fewer than two points, since there is
/// no segment to measure against.
pub fn point_to_polyline_distance(p: Point<f64>, points: &[Point<f64>]) -> f64 {
    points
        .windows(2)
        .map(|pair| point_to_segment_distance(p, pair[0], pair[1]))
        .fold(f64::INFINITY, f64::min)
}

/// Axis-aligned bounding box of a point sequence
///
/// Returns `None` for an empty slice.
pub fn bounding_box(points: &[Point<f64>]) -> Option<Rect<f64>> {
    let first = points.first()?;

    let mut min_x = first.x();
    let mut min_y = first.y();
    let mut max_x = first.x();
    let mut max_y = first.y();

    for point in &points[1..] {
        min_x = min_x.min(point.x());
        min_y = min_y.min(point.y());
        max_x = max_x.max(point.x());
        max_y = max_y.max(point.y());
    }

    Some(Rect::new(
        Coord { x: min_x, y: min_y },
        Coord { x: max_x, y: max_y },
    ))
}

/// Grow a bounding box by `margin` on all four sides
#[inline]
pub fn expand_bounding_box(bbox: Rect<f64>, margin: f64) -> Rect<f64> {
    let min = bbox.min();
    let max = bbox.max();
    Rect::new(
        Coord {
            x: min.x - margin,
            y: min.y - margin,
        },
        Coord {
            x: max.x + margin,
            y: max.y + margin,
        },
    )
}

/// Check whether two axis-aligned boxes overlap (touching counts)
///
/// Compares the x and y intervals independently, so boxes crossing in a
/// plus-sign pattern (no corner of either inside the other) still intersect.
#[inline]
pub fn bbox_intersect(bb1: Rect<f64>, bb2: Rect<f64>) -> bool {
    let (min1, max1) = (bb1.min(), bb1.max());
    let (min2, max2) = (bb2.min(), bb2.max());

    min1.x <= max2.x && max1.x >= min2.x && min1.y <= max2.y && max1.y >= min2.y
}
