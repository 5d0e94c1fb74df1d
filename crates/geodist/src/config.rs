//! Engine configuration.
//!
//! Layered from lowest to highest precedence: built-in defaults, an optional
//! TOML file, then environment variables. Command-line overrides are applied
//! by the caller on the resulting struct.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::models::types::{DistanceError, Result};

pub const COASTLINE_PATH_ENV: &str = "COASTLINE_PATH";
pub const WATERLINES_PATH_ENV: &str = "WATERLINES_PATH";
pub const UTM_ZONE_ENV: &str = "GEODIST_UTM_ZONE";

const DEFAULT_COASTLINE_PATH: &str = "data/boundaries/ITA_coastline.json";
const DEFAULT_WATERLINES_PATH: &str = "data/boundaries/ITA_water_lines.json";

/// Complete configuration for a `DistanceCalculator`
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct DistanceConfig {
    pub coastline_path: PathBuf,
    pub water_lines_path: PathBuf,
    pub projection: ProjectionConfig,
    pub thresholds: DistanceThresholds,
}

/// Target UTM zone for all metric computations
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub utm_zone: u8,
    pub south: bool,
}

/// Review filter limits in kilometres
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct DistanceThresholds {
    pub max_coast_km: f64,
    pub max_water_km: f64,
}

impl Default for DistanceConfig {
    fn default() -> Self {
        Self {
            coastline_path: PathBuf::from(DEFAULT_COASTLINE_PATH),
            water_lines_path: PathBuf::from(DEFAULT_WATERLINES_PATH),
            projection: ProjectionConfig::default(),
            thresholds: DistanceThresholds::default(),
        }
    }
}

impl Default for ProjectionConfig {
    /// UTM zone 33N (EPSG:32633) covers most of Italy
    fn default() -> Self {
        Self {
            utm_zone: 33,
            south: false,
        }
    }
}

impl Default for DistanceThresholds {
    fn default() -> Self {
        Self {
            max_coast_km: 50.0,
            max_water_km: 10.0,
        }
    }
}

impl ProjectionConfig {
    /// PROJ.4 definition of the target CRS
    pub fn proj_string(&self) -> String {
        let south = if self.south { " +south" } else { "" };
        format!(
            "+proj=utm +zone={}{} +datum=WGS84 +units=m +no_defs +type=crs",
            self.utm_zone, south
        )
    }
}

impl DistanceThresholds {
    /// Both distances are known and within limits.
    ///
    /// Negative values are treated as unknown and never admitted.
    pub fn admits(&self, coast_km: f64, water_km: f64) -> bool {
        (0.0..=self.max_coast_km).contains(&coast_km) && (0.0..=self.max_water_km).contains(&water_km)
    }
}

impl DistanceConfig {
    pub fn new(coastline_path: impl Into<PathBuf>, water_lines_path: impl Into<PathBuf>) -> Self {
        Self {
            coastline_path: coastline_path.into(),
            water_lines_path: water_lines_path.into(),
            ..Self::default()
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| DistanceError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DistanceError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Defaults overlaid with the process environment
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Overlay values produced by `lookup`; used by `with_env_overrides`
    pub fn with_overrides_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        if let Some(path) = lookup(COASTLINE_PATH_ENV) {
            self.coastline_path = PathBuf::from(path);
        }
        if let Some(path) = lookup(WATERLINES_PATH_ENV) {
            self.water_lines_path = PathBuf::from(path);
        }
        if let Some(zone) = lookup(UTM_ZONE_ENV) {
            self.projection.utm_zone = zone.trim().parse().map_err(|_| {
                DistanceError::Config(format!("{} is not a zone number: {:?}", UTM_ZONE_ENV, zone))
            })?;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=60).contains(&self.projection.utm_zone) {
            return Err(DistanceError::Config(format!(
                "UTM zone {} out of range (1-60)",
                self.projection.utm_zone
            )));
        }

        for (name, value) in [
            ("max_coast_km", self.thresholds.max_coast_km),
            ("max_water_km", self.thresholds.max_water_km),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DistanceError::Config(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}
