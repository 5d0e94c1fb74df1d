//! Core trait for distance queries.
//!
//! Collaborators (the enrichment pipeline, review filters) depend on this
//! trait rather than on a concrete calculator.

use crate::models::types::{GeoPoint, Result};

// ============================================================================
// Provider Trait
// ============================================================================

/// Source of coast and water distances for a WGS84 position
pub trait DistanceProvider: Send + Sync {
    /// Distance to the nearest point of the coastline outline (kilometres)
    fn coast_distance(&self, point: GeoPoint) -> Result<f64>;

    /// Distance to the nearest water line feature (kilometres)
    fn water_distance(&self, point: GeoPoint) -> Result<f64>;

    /// `(coast_km, water_km)`
    fn both_distances(&self, point: GeoPoint) -> Result<(f64, f64)> {
        Ok((self.coast_distance(point)?, self.water_distance(point)?))
    }
}
