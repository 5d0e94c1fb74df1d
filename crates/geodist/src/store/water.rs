//! Water line network with an R-tree, loaded on first use.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rstar::RTree;

use crate::models::types::{Dataset, DatasetState, DistanceError, ProjectedPoint, Result};
use crate::projection::Reprojector;
use crate::source::{line_features, read_geometries, SourceLine};
use crate::spatial::index::{build_segment_tree, WaterSegmentNode};
use crate::store::LazyDataset;

/// Projected water lines in source order
#[derive(Clone, Debug, Default)]
pub struct WaterFeatureSet {
    lines: Vec<SourceLine>,
}

impl WaterFeatureSet {
    pub fn new(lines: Vec<SourceLine>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[SourceLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Closest water line to a query
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaterMatch {
    /// Position of the feature in the source file
    pub feature: usize,
    /// Closest point on that feature
    pub point: ProjectedPoint,
    pub distance_m: f64,
}

/// Read-only segment tree over a `WaterFeatureSet`
pub struct SpatialIndex {
    tree: RTree<WaterSegmentNode>,
}

impl SpatialIndex {
    pub fn build(features: &WaterFeatureSet) -> Self {
        let tree = build_segment_tree(features.lines().iter().map(|l| (l.feature, &l.line)));
        Self { tree }
    }

    pub fn segment_count(&self) -> usize {
        self.tree.size()
    }

    /// Nearest segment to `point`; ties resolve to any minimal segment
    pub fn nearest(&self, point: ProjectedPoint) -> Option<WaterMatch> {
        let node = self.tree.nearest_neighbor(&point.as_array())?;
        let closest = node.closest_point(point);

        Some(WaterMatch {
            feature: node.feature,
            point: closest,
            distance_m: point.distance_to(&closest),
        })
    }
}

/// Feature set and index, built together and cached together
pub struct WaterNetwork {
    features: WaterFeatureSet,
    index: SpatialIndex,
}

impl WaterNetwork {
    pub fn new(features: WaterFeatureSet) -> Self {
        let index = SpatialIndex::build(&features);
        Self { features, index }
    }

    pub fn features(&self) -> &WaterFeatureSet {
        &self.features
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }
}

pub struct WaterNetworkIndex {
    path: PathBuf,
    reprojector: Arc<Reprojector>,
    network: LazyDataset<WaterNetwork>,
}

impl WaterNetworkIndex {
    pub fn new(path: impl Into<PathBuf>, reprojector: Arc<Reprojector>) -> Self {
        Self {
            path: path.into(),
            reprojector,
            network: LazyDataset::new(Dataset::WaterLines),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> DatasetState {
        self.network.state()
    }

    pub fn is_loaded(&self) -> bool {
        self.state() == DatasetState::Loaded
    }

    pub(crate) fn load_count(&self) -> usize {
        self.network.load_count()
    }

    /// Parse, project, and index on first call; later calls return the
    /// cached network
    pub fn ensure_loaded(&self) -> Result<&WaterNetwork> {
        self.network.get_or_load(|| self.load())
    }

    /// Closest point on the closest water line
    pub fn nearest_feature(&self, point: ProjectedPoint) -> Result<ProjectedPoint> {
        Ok(self.nearest_match(point)?.point)
    }

    pub fn nearest_match(&self, point: ProjectedPoint) -> Result<WaterMatch> {
        let network = self.ensure_loaded()?;
        log::debug!("Nearest water feature to ({:.1}, {:.1})", point.x, point.y);

        // A loaded network always holds at least one segment
        network.index().nearest(point).ok_or_else(|| {
            DistanceError::unavailable(Dataset::WaterLines, &self.path, "spatial index is empty")
        })
    }

    fn load(&self) -> Result<WaterNetwork> {
        let unavailable = |reason: String| DistanceError::unavailable(Dataset::WaterLines, &self.path, reason);

        let geometries = read_geometries(Dataset::WaterLines, &self.path)?;
        let lines = line_features(&geometries).map_err(unavailable)?;

        let projected = lines
            .into_iter()
            .map(|source| {
                self.reprojector
                    .project_line(&source.line)
                    .map(|line| SourceLine { feature: source.feature, line })
                    .map_err(|e| format!("feature {}: {}", source.feature, e))
            })
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(unavailable)?;

        let network = WaterNetwork::new(WaterFeatureSet::new(projected));

        log::info!(
            "Indexed {} water lines ({} segments) from {} features in {}",
            network.features().len(),
            network.index().segment_count(),
            geometries.len(),
            self.path.display()
        );

        Ok(network)
    }
}
