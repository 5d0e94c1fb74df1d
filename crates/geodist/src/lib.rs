//! # immo-geodist
//!
//! Coast and water distances for property listings.
//!
//! ## Features
//!
//! - **Metric distances**: every query is reprojected to a UTM zone and
//!   measured in metres, then reported in kilometres
//! - **Lazy datasets**: the coastline outline and the water network load on
//!   the first query that needs them, once, and stay cached
//! - **Spatial queries**: fast R-tree nearest-segment search over the water
//!   network
//! - **Explicit failures**: a missing or malformed dataset is an error, never
//!   a silent zero distance
//!
//! ## Example
//!
//! ```no_run
//! use immo_geodist::prelude::*;
//!
//! let calculator = DistanceCalculator::new(DistanceConfig::new(
//!     "data/boundaries/ITA_coastline.json",
//!     "data/boundaries/ITA_water_lines.json",
//! ))?;
//!
//! // Viareggio
//! let (coast_km, water_km) = calculator.calculate_both_distances(43.8667, 10.25)?;
//! assert!(coast_km >= 0.0 && water_km >= 0.0);
//! # Ok::<(), DistanceError>(())
//! ```

pub mod calculator;
pub mod config;
pub mod models;
pub mod projection;
pub mod source;
pub mod spatial;
pub mod store;

// Re-exports for convenience
pub mod prelude {
    pub use crate::calculator::DistanceCalculator;
    pub use crate::config::{DistanceConfig, DistanceThresholds, ProjectionConfig};
    pub use crate::models::{traits::*, types::*};
    pub use crate::projection::Reprojector;
    pub use crate::store::{CoastlineStore, WaterMatch, WaterNetworkIndex};
}

pub use prelude::*;
