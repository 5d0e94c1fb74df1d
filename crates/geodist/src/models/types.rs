//! Core data types and enums for distance queries.

use std::fmt;
use std::path::PathBuf;

use geo::{Coord, Point};

// ============================================================================
// Enums
// ============================================================================

/// The two reference datasets the engine can load
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dataset {
    Coastline,
    WaterLines,
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Coastline => write!(f, "coastline"),
            Self::WaterLines => write!(f, "water lines"),
        }
    }
}

/// Lifecycle of a lazily loaded dataset.
///
/// There is no transition back to `NotLoaded` once a load succeeds.
/// A failed load returns to `NotLoaded` so the next query retries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DatasetState {
    NotLoaded,
    Loading,
    Loaded,
}

// ============================================================================
// Data Structures
// ============================================================================

/// A WGS84 position in degrees.
///
/// Converts to `geo::Point` with longitude on the x axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Reject NaN and infinite coordinates before they reach the projection
    pub fn validate(self) -> Result<Self> {
        if self.is_finite() {
            Ok(self)
        } else {
            Err(DistanceError::InvalidInput {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }
}

impl From<(f64, f64)> for GeoPoint {
    /// `(latitude, longitude)`
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

impl From<GeoPoint> for Point {
    fn from(p: GeoPoint) -> Self {
        Point::new(p.longitude, p.latitude)
    }
}

/// A position in metres under the engine's projected CRS
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
}

impl ProjectedPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Straight-line separation in metres
    pub fn distance_to(&self, other: &ProjectedPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub(crate) fn as_array(&self) -> [f64; 2] {
        [self.x, self.y]
    }
}

impl From<ProjectedPoint> for Point {
    fn from(p: ProjectedPoint) -> Self {
        Point::new(p.x, p.y)
    }
}

impl From<Point> for ProjectedPoint {
    fn from(p: Point) -> Self {
        Self::new(p.x(), p.y())
    }
}

impl From<Coord> for ProjectedPoint {
    fn from(c: Coord) -> Self {
        Self::new(c.x, c.y)
    }
}

impl From<ProjectedPoint> for Coord {
    fn from(p: ProjectedPoint) -> Self {
        Coord { x: p.x, y: p.y }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DistanceError {
    #[error("{dataset} data unavailable at {}: {reason}", path.display())]
    DataUnavailable {
        dataset: Dataset,
        path: PathBuf,
        reason: String,
    },

    #[error("Invalid coordinates: latitude {latitude}, longitude {longitude}")]
    InvalidInput { latitude: f64, longitude: f64 },

    #[error("Projection error: {0}")]
    Projection(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl DistanceError {
    pub(crate) fn unavailable(
        dataset: Dataset,
        path: impl Into<PathBuf>,
        reason: impl Into<String>,
    ) -> Self {
        Self::DataUnavailable {
            dataset,
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True when the failure is systemic (a dataset cannot be used) rather
    /// than specific to one query
    pub fn is_data_unavailable(&self) -> bool {
        matches!(self, Self::DataUnavailable { .. })
    }
}

pub type Result<T> = std::result::Result<T, DistanceError>;
