//! Distance calculator: the engine's public façade.
//!
//! Construct one per process at the composition root and share it by
//! reference (it is `Send + Sync`). Each dataset loads on the first query
//! that needs it and stays cached for the calculator's lifetime.

use std::sync::Arc;

use crate::config::DistanceConfig;
use crate::models::traits::DistanceProvider;
use crate::models::types::{DatasetState, GeoPoint, Result};
use crate::projection::Reprojector;
use crate::spatial::queries::{meters_to_km, planar_distance_km};
use crate::store::{CoastlineStore, WaterNetworkIndex};

pub struct DistanceCalculator {
    config: DistanceConfig,
    reprojector: Arc<Reprojector>,
    coastline: CoastlineStore,
    water: WaterNetworkIndex,
}

impl DistanceCalculator {
    /// Validate `config` and prepare the reprojector. No dataset is read here.
    pub fn new(config: DistanceConfig) -> Result<Self> {
        config.validate()?;

        let reprojector = Arc::new(Reprojector::new(&config.projection)?);
        let coastline = CoastlineStore::new(&config.coastline_path, Arc::clone(&reprojector));
        let water = WaterNetworkIndex::new(&config.water_lines_path, Arc::clone(&reprojector));

        log::debug!(
            "Distance calculator ready (coastline: {}, water lines: {}, crs: {})",
            coastline.path().display(),
            water.path().display(),
            reprojector.definition()
        );

        Ok(Self {
            config,
            reprojector,
            coastline,
            water,
        })
    }

    pub fn config(&self) -> &DistanceConfig {
        &self.config
    }

    pub fn reprojector(&self) -> &Reprojector {
        &self.reprojector
    }

    pub fn coastline(&self) -> &CoastlineStore {
        &self.coastline
    }

    pub fn water_network(&self) -> &WaterNetworkIndex {
        &self.water
    }

    pub fn coastline_state(&self) -> DatasetState {
        self.coastline.state()
    }

    pub fn water_state(&self) -> DatasetState {
        self.water.state()
    }

    pub fn is_coastline_loaded(&self) -> bool {
        self.coastline.is_loaded()
    }

    pub fn is_water_loaded(&self) -> bool {
        self.water.is_loaded()
    }

    /// Kilometres from `(latitude, longitude)` to the nearest point of the
    /// coastline outline
    pub fn calculate_coast_distance(&self, latitude: f64, longitude: f64) -> Result<f64> {
        let point = GeoPoint::new(latitude, longitude).validate()?;

        let (on_coast, query) = self.coastline.nearest_boundary_point(point)?;
        let km = planar_distance_km(on_coast, query);

        log::debug!("Coast distance at ({}, {}): {:.3} km", latitude, longitude, km);
        Ok(km)
    }

    /// Kilometres from `(latitude, longitude)` to the nearest water line
    pub fn calculate_water_distance(&self, latitude: f64, longitude: f64) -> Result<f64> {
        let point = GeoPoint::new(latitude, longitude).validate()?;

        self.water.ensure_loaded()?;
        let query = self.reprojector.project(point)?;
        let nearest = self.water.nearest_feature(query)?;
        let km = planar_distance_km(query, nearest);

        log::debug!("Water distance at ({}, {}): {:.3} km", latitude, longitude, km);
        Ok(km)
    }

    /// `(coast_km, water_km)`; each dataset is loaded independently
    pub fn calculate_both_distances(&self, latitude: f64, longitude: f64) -> Result<(f64, f64)> {
        let coast = self.calculate_coast_distance(latitude, longitude)?;
        let water = self.calculate_water_distance(latitude, longitude)?;
        Ok((coast, water))
    }

    /// Nearest water feature's position in the source file and its distance
    /// in kilometres
    pub fn nearest_water_feature(&self, latitude: f64, longitude: f64) -> Result<(usize, f64)> {
        let point = GeoPoint::new(latitude, longitude).validate()?;

        self.water.ensure_loaded()?;
        let query = self.reprojector.project(point)?;
        let found = self.water.nearest_match(query)?;
        Ok((found.feature, meters_to_km(found.distance_m)))
    }
}

impl DistanceProvider for DistanceCalculator {
    fn coast_distance(&self, point: GeoPoint) -> Result<f64> {
        self.calculate_coast_distance(point.latitude, point.longitude)
    }

    fn water_distance(&self, point: GeoPoint) -> Result<f64> {
        self.calculate_water_distance(point.latitude, point.longitude)
    }

    fn both_distances(&self, point: GeoPoint) -> Result<(f64, f64)> {
        self.calculate_both_distances(point.latitude, point.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types::{Dataset, DistanceError};
    use crate::test_support::fixture;
    use std::path::Path;

    // Reference locations in Tuscany (lat, lon)
    const VIAREGGIO: (f64, f64) = (43.8667, 10.25);
    const LUCCA: (f64, f64) = (43.8438, 10.5077);
    const FLORENCE: (f64, f64) = (43.7696, 11.2558);

    fn calculator() -> DistanceCalculator {
        DistanceCalculator::new(DistanceConfig::new(
            fixture("coastline.geojson"),
            fixture("water_lines.geojson"),
        ))
        .unwrap()
    }

    /// Calculator reading copies of the fixtures inside `dir`
    fn calculator_in(dir: &Path) -> DistanceCalculator {
        let coast = dir.join("coast.geojson");
        let water = dir.join("water.geojson");
        std::fs::copy(fixture("coastline.geojson"), &coast).unwrap();
        std::fs::copy(fixture("water_lines.geojson"), &water).unwrap();
        DistanceCalculator::new(DistanceConfig::new(coast, water)).unwrap()
    }

    #[test]
    fn test_construction_loads_nothing() {
        let calc = calculator();
        assert_eq!(calc.coastline_state(), DatasetState::NotLoaded);
        assert_eq!(calc.water_state(), DatasetState::NotLoaded);
    }

    #[test]
    fn test_coast_query_loads_only_coastline() {
        let calc = calculator();
        let km = calc.calculate_coast_distance(LUCCA.0, LUCCA.1).unwrap();

        assert!(km >= 0.0);
        assert!(calc.is_coastline_loaded());
        assert!(!calc.is_water_loaded());
    }

    #[test]
    fn test_water_query_loads_only_water() {
        let calc = calculator();
        let km = calc.calculate_water_distance(LUCCA.0, LUCCA.1).unwrap();

        assert!(km >= 0.0);
        assert!(calc.is_water_loaded());
        assert!(!calc.is_coastline_loaded());
    }

    #[test]
    fn test_both_distances() {
        let calc = calculator();
        let (coast, water) = calc.calculate_both_distances(FLORENCE.0, FLORENCE.1).unwrap();

        assert!(calc.is_coastline_loaded());
        assert!(calc.is_water_loaded());
        assert_eq!(coast, calc.calculate_coast_distance(FLORENCE.0, FLORENCE.1).unwrap());
        assert_eq!(water, calc.calculate_water_distance(FLORENCE.0, FLORENCE.1).unwrap());
    }

    #[test]
    fn test_coastal_vs_inland() {
        let calc = calculator();
        let viareggio = calc.calculate_coast_distance(VIAREGGIO.0, VIAREGGIO.1).unwrap();
        let lucca = calc.calculate_coast_distance(LUCCA.0, LUCCA.1).unwrap();
        let florence = calc.calculate_coast_distance(FLORENCE.0, FLORENCE.1).unwrap();

        // Viareggio sits 0.05 degrees east of the outline
        assert!(viareggio > 3.0 && viareggio < 5.0, "{}", viareggio);
        assert!(viareggio < lucca);
        assert!(lucca < florence);
    }

    #[test]
    fn test_point_on_coast_is_near_zero() {
        let calc = calculator();
        // On a vertex
        assert!(calc.calculate_coast_distance(43.75, 10.2).unwrap() < 1e-6);
        // Mid-edge: the projected edge is a chord of the curved meridian
        assert!(calc.calculate_coast_distance(43.6, 10.2).unwrap() < 0.05);
    }

    #[test]
    fn test_river_city_is_close_to_water() {
        let calc = calculator();
        let km = calc.calculate_water_distance(FLORENCE.0, FLORENCE.1).unwrap();
        assert!(km < 0.5, "{}", km);

        let (feature, feature_km) = calc.nearest_water_feature(FLORENCE.0, FLORENCE.1).unwrap();
        assert_eq!(feature, 0);
        assert_eq!(feature_km, km);
    }

    #[test]
    fn test_kilometres_are_metres_over_thousand() {
        let calc = calculator();
        let query = calc.reprojector().project(GeoPoint::new(44.2, 11.0)).unwrap();
        let nearest = calc.water_network().nearest_feature(query).unwrap();

        let km = calc.calculate_water_distance(44.2, 11.0).unwrap();
        assert!((km - query.distance_to(&nearest) / 1000.0).abs() < 1e-12);
    }

    #[test]
    fn test_non_negative_over_grid() {
        let calc = calculator();
        for lat in [42.5, 43.0, 43.7, 44.4, 45.5] {
            for lon in [9.5, 10.2, 11.0, 12.5, 13.5] {
                let (coast, water) = calc.calculate_both_distances(lat, lon).unwrap();
                assert!(coast >= 0.0 && water >= 0.0, "({}, {})", lat, lon);
            }
        }
    }

    #[test]
    fn test_cached_datasets_survive_file_removal() {
        let dir = tempfile::tempdir().unwrap();
        let calc = calculator_in(dir.path());

        let first = calc.calculate_both_distances(LUCCA.0, LUCCA.1).unwrap();
        let coast_ptr = calc.coastline().ensure_loaded().unwrap() as *const _;
        let water_ptr = calc.water_network().ensure_loaded().unwrap() as *const _;

        std::fs::remove_file(dir.path().join("coast.geojson")).unwrap();
        std::fs::remove_file(dir.path().join("water.geojson")).unwrap();

        let second = calc.calculate_both_distances(LUCCA.0, LUCCA.1).unwrap();
        assert_eq!(first, second);
        assert!(std::ptr::eq(coast_ptr, calc.coastline().ensure_loaded().unwrap()));
        assert!(std::ptr::eq(water_ptr, calc.water_network().ensure_loaded().unwrap()));
        assert_eq!(calc.coastline().load_count(), 1);
        assert_eq!(calc.water_network().load_count(), 1);
    }

    #[test]
    fn test_missing_dataset_is_explicit_failure() {
        let calc = DistanceCalculator::new(DistanceConfig::new(
            "/nonexistent/ITA_coastline.json",
            fixture("water_lines.geojson"),
        ))
        .unwrap();

        match calc.calculate_coast_distance(LUCCA.0, LUCCA.1) {
            Err(DistanceError::DataUnavailable { dataset, .. }) => assert_eq!(dataset, Dataset::Coastline),
            other => panic!("Expected DataUnavailable, got {:?}", other),
        }
        assert_eq!(calc.coastline_state(), DatasetState::NotLoaded);

        // The other dataset is unaffected
        assert!(calc.calculate_water_distance(LUCCA.0, LUCCA.1).is_ok());
    }

    #[test]
    fn test_retry_after_dataset_appears() {
        let dir = tempfile::tempdir().unwrap();
        let coast = dir.path().join("coast.geojson");
        let calc = DistanceCalculator::new(DistanceConfig::new(&coast, fixture("water_lines.geojson"))).unwrap();

        assert!(calc.calculate_coast_distance(LUCCA.0, LUCCA.1).is_err());

        std::fs::copy(fixture("coastline.geojson"), &coast).unwrap();
        assert!(calc.calculate_coast_distance(LUCCA.0, LUCCA.1).is_ok());
        assert!(calc.is_coastline_loaded());
    }

    #[test]
    fn test_non_finite_input_rejected_before_loading() {
        let calc = calculator();

        let err = calc.calculate_coast_distance(f64::NAN, 10.0).unwrap_err();
        assert!(matches!(err, DistanceError::InvalidInput { .. }));
        let err = calc.calculate_water_distance(43.0, f64::INFINITY).unwrap_err();
        assert!(matches!(err, DistanceError::InvalidInput { .. }));

        assert!(!calc.is_coastline_loaded());
        assert!(!calc.is_water_loaded());
    }

    #[test]
    fn test_concurrent_first_queries_share_one_load() {
        let calc = calculator();

        let results: Vec<f64> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| calc.calculate_water_distance(LUCCA.0, LUCCA.1).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(results.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(calc.water_network().load_count(), 1);
    }

    #[test]
    fn test_latitude_beyond_pole_is_invalid_input() {
        let calc = calculator();

        match calc.calculate_coast_distance(95.0, 10.0) {
            Err(DistanceError::InvalidInput { latitude, .. }) => assert_eq!(latitude, 95.0),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
        assert!(matches!(
            calc.calculate_water_distance(-91.0, 10.0),
            Err(DistanceError::InvalidInput { .. })
        ));

        // Longitude is not range checked; it wraps through the projection
        assert!(calc.calculate_coast_distance(43.8, 190.0).is_ok());
    }

    #[test]
    fn test_stores_read_configured_paths() {
        let calc = calculator();
        assert_eq!(calc.coastline().path(), fixture("coastline.geojson"));
        assert_eq!(calc.water_network().path(), fixture("water_lines.geojson"));
    }

    #[test]
    fn test_provider_trait_delegates() {
        let calc = calculator();
        let provider: &dyn DistanceProvider = &calc;
        let point = GeoPoint::from(VIAREGGIO);

        assert_eq!(
            provider.both_distances(point).unwrap(),
            calc.calculate_both_distances(VIAREGGIO.0, VIAREGGIO.1).unwrap()
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = DistanceConfig::default();
        config.projection.utm_zone = 0;
        assert!(matches!(DistanceCalculator::new(config), Err(DistanceError::Config(_))));
    }
}
