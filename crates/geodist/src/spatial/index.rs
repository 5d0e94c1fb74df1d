//! R-tree nodes for the water network.
//!
//! Each water feature is split into its individual segments and every
//! segment becomes one tree entry. The envelope is the segment's bounding
//! box, so `nearest_neighbor` prunes by box distance and then resolves the
//! exact point-to-segment distance on the survivors. Coordinates are
//! projected metres, so plain Euclidean distance is exact here.

use geo::{Line, LineString};
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::models::types::ProjectedPoint;
use crate::spatial::queries::closest_point_on_segment;

// ============================================================================
// Water Segment Spatial Node
// ============================================================================

#[derive(Clone, Debug)]
pub struct WaterSegmentNode {
    /// Position of the owning feature in the source file
    pub feature: usize,
    pub segment: Line,
    aabb: AABB<[f64; 2]>,
}

impl WaterSegmentNode {
    pub fn new(segment: Line, feature: usize) -> Self {
        let start = [segment.start.x, segment.start.y];
        let end = [segment.end.x, segment.end.y];

        let aabb = AABB::from_corners(start, end);

        Self {
            feature,
            segment,
            aabb,
        }
    }

    /// Closest point of this segment to `point`
    pub fn closest_point(&self, point: ProjectedPoint) -> ProjectedPoint {
        let (closest, _) = closest_point_on_segment(&self.segment, point.as_array());
        ProjectedPoint::new(closest[0], closest[1])
    }
}

impl RTreeObject for WaterSegmentNode {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

impl PointDistance for WaterSegmentNode {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        closest_point_on_segment(&self.segment, *point).1
    }
}

/// Segment nodes for one projected line.
///
/// A single-vertex line becomes one zero-length segment so it stays
/// searchable.
pub fn line_segments(line: &LineString, feature: usize) -> Vec<WaterSegmentNode> {
    match line.0.as_slice() {
        [] => Vec::new(),
        [only] => vec![WaterSegmentNode::new(Line::new(*only, *only), feature)],
        _ => line
            .lines()
            .map(|segment| WaterSegmentNode::new(segment, feature))
            .collect(),
    }
}

/// Bulk-load the tree from every segment of every line
pub fn build_segment_tree<'a>(lines: impl IntoIterator<Item = (usize, &'a LineString)>) -> RTree<WaterSegmentNode> {
    let segments: Vec<WaterSegmentNode> = lines
        .into_iter()
        .flat_map(|(feature, line)| line_segments(line, feature))
        .collect();

    RTree::bulk_load(segments)
}
