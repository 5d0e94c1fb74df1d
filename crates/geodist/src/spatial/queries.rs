//! Planar distance utilities.
//!
//! Inputs are projected coordinates in metres; nothing here works on degrees.

use geo::{Closest, ClosestPoint, Line, LineString, Point};

use crate::models::types::ProjectedPoint;

/// Convert metres to kilometres without rounding
pub fn meters_to_km(meters: f64) -> f64 {
    meters / 1000.0
}

/// Euclidean distance between two projected points in kilometres
pub fn planar_distance_km(a: ProjectedPoint, b: ProjectedPoint) -> f64 {
    meters_to_km(a.distance_to(&b))
}

/// Closest point on a segment and its squared distance to `point`
pub fn closest_point_on_segment(segment: &Line, point: [f64; 2]) -> ([f64; 2], f64) {
    let a = [segment.start.x, segment.start.y];
    let b = [segment.end.x, segment.end.y];

    let ab = [b[0] - a[0], b[1] - a[1]];
    let ap = [point[0] - a[0], point[1] - a[1]];

    let ab_ab = ab[0] * ab[0] + ab[1] * ab[1];

    let closest = if ab_ab == 0.0 {
        // Segment is actually a point
        a
    } else {
        let t = ((ab[0] * ap[0] + ab[1] * ap[1]) / ab_ab).clamp(0.0, 1.0);
        [a[0] + t * ab[0], a[1] + t * ab[1]]
    };

    let dx = point[0] - closest[0];
    let dy = point[1] - closest[1];

    (closest, dx * dx + dy * dy)
}

/// Closest point on a projected line string.
///
/// Returns `None` only for an empty line.
pub fn closest_point_on_line(line: &LineString, point: ProjectedPoint) -> Option<ProjectedPoint> {
    let first = *line.0.first()?;

    match line.closest_point(&Point::from(point)) {
        Closest::Intersection(p) | Closest::SinglePoint(p) => Some(p.into()),
        // Every segment is degenerate, so all vertices coincide
        Closest::Indeterminate => Some(first.into()),
    }
}
