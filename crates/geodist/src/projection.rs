//! WGS84 to UTM reprojection.
//!
//! All distance math runs on projected coordinates. Euclidean distance in a
//! single UTM zone stays within a fraction of a percent of the geodesic
//! distance across Italy, even at the zone edges.

use std::fmt;

use geo::{Coord, LineString};
use proj4rs::{proj::Proj, transform::transform};

use crate::config::ProjectionConfig;
use crate::models::types::{DistanceError, GeoPoint, ProjectedPoint, Result};

const WGS84_LONGLAT: &str = "+proj=longlat +datum=WGS84 +no_defs +type=crs";

/// Stateless geographic to projected converter.
///
/// Axis order is fixed: longitude/easting on x, latitude/northing on y.
pub struct Reprojector {
    source: Proj,
    target: Proj,
    definition: String,
}

impl Reprojector {
    pub fn new(config: &ProjectionConfig) -> Result<Self> {
        let definition = config.proj_string();

        let source = Proj::from_proj_string(WGS84_LONGLAT)
            .map_err(|e| DistanceError::Projection(format!("{}: {}", WGS84_LONGLAT, e)))?;
        let target = Proj::from_proj_string(&definition)
            .map_err(|e| DistanceError::Projection(format!("{}: {}", definition, e)))?;

        Ok(Self {
            source,
            target,
            definition,
        })
    }

    /// PROJ.4 definition of the target CRS
    pub fn definition(&self) -> &str {
        &self.definition
    }

    /// Project a query point. Non-finite input fails with `InvalidInput`.
    pub fn project(&self, point: GeoPoint) -> Result<ProjectedPoint> {
        let point = point.validate()?;
        self.project_lon_lat(point.longitude, point.latitude)
            .map_err(|_| DistanceError::InvalidInput {
                latitude: point.latitude,
                longitude: point.longitude,
            })
    }

    /// Project a raw `(lon, lat)` pair; the error carries the library message.
    pub(crate) fn project_lon_lat(&self, lon: f64, lat: f64) -> std::result::Result<ProjectedPoint, String> {
        if !lon.is_finite() || !lat.is_finite() {
            return Err(format!("non-finite coordinate ({}, {})", lon, lat));
        }

        // Degrees -> radians in, metres out
        let mut point = (lon.to_radians(), lat.to_radians(), 0.0);
        transform(&self.source, &self.target, &mut point)
            .map_err(|e| format!("cannot project ({}, {}): {}", lon, lat, e))?;

        if point.0.is_finite() && point.1.is_finite() {
            Ok(ProjectedPoint::new(point.0, point.1))
        } else {
            Err(format!("projection of ({}, {}) is not finite", lon, lat))
        }
    }

    /// Project every vertex of a `(lon, lat)` line string
    pub(crate) fn project_line(&self, line: &LineString) -> std::result::Result<LineString, String> {
        line.0
            .iter()
            .map(|c| self.project_lon_lat(c.x, c.y).map(Coord::from))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(LineString::new)
    }
}

impl fmt::Debug for Reprojector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reprojector")
            .field("definition", &self.definition)
            .finish()
    }
}
