//! Coastline outline, loaded on first use.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use geo::LineString;

use crate::models::types::{Dataset, DatasetState, DistanceError, GeoPoint, ProjectedPoint, Result};
use crate::projection::Reprojector;
use crate::source::{first_polygon_ring, read_geometries};
use crate::spatial::queries::closest_point_on_line;
use crate::store::LazyDataset;

/// Projected outer ring of the landmass polygon, closed
#[derive(Clone, Debug)]
pub struct CoastlineBoundary {
    ring: LineString,
}

impl CoastlineBoundary {
    /// Build from an already projected ring, closing it if needed
    pub fn from_projected_ring(mut ring: LineString) -> std::result::Result<Self, String> {
        if ring.0.len() < 2 {
            return Err(format!("boundary needs at least 2 coordinates, got {}", ring.0.len()));
        }
        ring.close();
        Ok(Self { ring })
    }

    pub fn ring(&self) -> &LineString {
        &self.ring
    }

    pub fn vertex_count(&self) -> usize {
        self.ring.0.len()
    }

    /// Closest point of the outline to `point`
    pub fn nearest_point(&self, point: ProjectedPoint) -> ProjectedPoint {
        // The ring is non-empty by construction
        closest_point_on_line(&self.ring, point).unwrap_or_default()
    }
}

pub struct CoastlineStore {
    path: PathBuf,
    reprojector: Arc<Reprojector>,
    boundary: LazyDataset<CoastlineBoundary>,
}

impl CoastlineStore {
    pub fn new(path: impl Into<PathBuf>, reprojector: Arc<Reprojector>) -> Self {
        Self {
            path: path.into(),
            reprojector,
            boundary: LazyDataset::new(Dataset::Coastline),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> DatasetState {
        self.boundary.state()
    }

    pub fn is_loaded(&self) -> bool {
        self.state() == DatasetState::Loaded
    }

    pub(crate) fn load_count(&self) -> usize {
        self.boundary.load_count()
    }

    /// Parse and project the outline on first call; later calls return the
    /// cached boundary
    pub fn ensure_loaded(&self) -> Result<&CoastlineBoundary> {
        self.boundary.get_or_load(|| self.load())
    }

    /// `(point on boundary, projected query point)` minimising their separation
    pub fn nearest_boundary_point(&self, point: GeoPoint) -> Result<(ProjectedPoint, ProjectedPoint)> {
        let boundary = self.ensure_loaded()?;
        let query = self.reprojector.project(point)?;
        Ok((boundary.nearest_point(query), query))
    }

    fn load(&self) -> Result<CoastlineBoundary> {
        let unavailable = |reason: String| DistanceError::unavailable(Dataset::Coastline, &self.path, reason);

        let geometries = read_geometries(Dataset::Coastline, &self.path)?;
        let ring = first_polygon_ring(&geometries).map_err(unavailable)?;
        let projected = self.reprojector.project_line(&ring).map_err(unavailable)?;
        let boundary = CoastlineBoundary::from_projected_ring(projected).map_err(unavailable)?;

        log::info!(
            "Coastline boundary from {} has {} vertices",
            self.path.display(),
            boundary.vertex_count()
        );

        Ok(boundary)
    }
}
