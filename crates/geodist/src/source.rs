//! Reading reference datasets from GeoJSON files.
//!
//! Files may hold a `FeatureCollection`, a single `Feature`, or a bare
//! `Geometry`. Coordinates stay in WGS84 `(lon, lat)` order here; the stores
//! reproject them.

use std::path::Path;

use geo::{Coord, LineString};
use geojson::{GeoJson, Value};

use crate::models::types::{Dataset, DistanceError, Result};

/// Read and parse a GeoJSON file into its geometry values, in file order.
///
/// Features without a geometry are kept as `None` so positions still match
/// the source file.
pub fn read_geometries(dataset: Dataset, path: &Path) -> Result<Vec<Option<Value>>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| DistanceError::unavailable(dataset, path, format!("cannot read file: {}", e)))?;

    let geojson: GeoJson = content
        .parse()
        .map_err(|e| DistanceError::unavailable(dataset, path, format!("invalid GeoJSON: {}", e)))?;

    Ok(match geojson {
        GeoJson::Geometry(geom) => vec![Some(geom.value)],
        GeoJson::Feature(feature) => vec![feature.geometry.map(|g| g.value)],
        GeoJson::FeatureCollection(fc) => fc
            .features
            .into_iter()
            .map(|f| f.geometry.map(|g| g.value))
            .collect(),
    })
}

/// Outer ring of the first polygon found in `geometries`.
///
/// A `MultiPolygon` contributes its first polygon. Non-polygon features are
/// skipped.
pub fn first_polygon_ring(geometries: &[Option<Value>]) -> std::result::Result<LineString, String> {
    for value in geometries.iter().flatten() {
        let rings = match value {
            Value::Polygon(rings) => rings,
            Value::MultiPolygon(polygons) => match polygons.first() {
                Some(rings) => rings,
                None => return Err("first MultiPolygon is empty".into()),
            },
            _ => continue,
        };

        let exterior = rings.first().ok_or("polygon has no rings")?;
        let ring = positions_to_linestring(exterior)?;
        if ring.0.len() < 2 {
            return Err(format!("polygon outer ring has {} coordinates", ring.0.len()));
        }
        return Ok(ring);
    }

    Err("no Polygon feature found".into())
}

/// A line extracted from a water dataset with the index of its source feature
#[derive(Clone, Debug)]
pub struct SourceLine {
    pub feature: usize,
    pub line: LineString,
}

/// Every usable line in `geometries`.
///
/// `LineString` and `MultiLineString` parts are taken as-is; polygon rings
/// count as lake edges. Empty parts and other geometry types are skipped
/// with a warning.
pub fn line_features(geometries: &[Option<Value>]) -> std::result::Result<Vec<SourceLine>, String> {
    let mut lines = Vec::new();
    let mut skipped = 0usize;

    for (feature, value) in geometries.iter().enumerate() {
        let parts: Vec<&Vec<Vec<f64>>> = match value {
            Some(Value::LineString(coords)) => vec![coords],
            Some(Value::MultiLineString(parts)) => parts.iter().collect(),
            Some(Value::Polygon(rings)) => rings.iter().collect(),
            Some(Value::MultiPolygon(polygons)) => polygons.iter().flatten().collect(),
            _ => {
                skipped += 1;
                continue;
            }
        };

        for coords in parts {
            if coords.is_empty() {
                skipped += 1;
                continue;
            }
            let line = positions_to_linestring(coords)
                .map_err(|e| format!("feature {}: {}", feature, e))?;
            lines.push(SourceLine { feature, line });
        }
    }

    if skipped > 0 {
        log::warn!("Skipped {} empty or non-line water features", skipped);
    }

    if lines.is_empty() {
        return Err("no line features found".into());
    }

    Ok(lines)
}

/// Convert GeoJSON positions to a line string, rejecting short or
/// non-finite positions
fn positions_to_linestring(positions: &[Vec<f64>]) -> std::result::Result<LineString, String> {
    positions
        .iter()
        .map(|pos| match pos.as_slice() {
            [x, y, ..] if x.is_finite() && y.is_finite() => Ok(Coord { x: *x, y: *y }),
            other => Err(format!("malformed position {:?}", other)),
        })
        .collect::<std::result::Result<Vec<_>, _>>()
        .map(LineString::new)
}
