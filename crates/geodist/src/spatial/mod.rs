//! Spatial indexing and planar query utilities.

pub mod index;
pub mod queries;

pub use index::WaterSegmentNode;
pub use queries::{closest_point_on_line, closest_point_on_segment, meters_to_km, planar_distance_km};
