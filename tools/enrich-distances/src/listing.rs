use immo_geodist::{DistanceError, DistanceProvider, DistanceThresholds, GeoPoint};
use serde::{Deserialize, Deserializer, Serialize};

/// Stored in place of a distance that could not be computed
pub const UNKNOWN_DISTANCE: f64 = -1.0;

/// A scraped property listing.
///
/// Only the fields this tool reads or writes are typed; everything else is
/// carried through untouched. A coordinate string that is not a number
/// reads as missing and is written back as `null`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: u64,
    #[serde(default, deserialize_with = "coordinate")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "coordinate")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub dist_coast: Option<f64>,
    #[serde(default)]
    pub dist_water: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Listing {
    pub fn location(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
            _ => None,
        }
    }
}

/// Coordinates arrive as numbers or as strings ("43.8667")
fn coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(v)) => Some(v),
        Some(Raw::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

/// Two decimal places, as stored on listings
pub fn round_km(km: f64) -> f64 {
    (km * 100.0).round() / 100.0
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EnrichStats {
    pub total: usize,
    pub coast_computed: usize,
    pub water_computed: usize,
    pub missing_coordinates: usize,
    pub failed: usize,
    pub within_thresholds: usize,
}

impl EnrichStats {
    pub fn log_summary(&self) {
        log::info!("=== Summary ===");
        log::info!("Listings:            {}", self.total);
        log::info!("Coast distances:     {}", self.coast_computed);
        log::info!("Water distances:     {}", self.water_computed);
        log::info!("Missing coordinates: {}", self.missing_coordinates);
        log::info!("Failed lookups:      {}", self.failed);
        log::info!("Within thresholds:   {}", self.within_thresholds);
    }
}

/// Fill whichever distance fields are still empty.
///
/// Listings without coordinates get the sentinel on both fields. A lookup
/// that fails for this listing alone also gets the sentinel; a dataset that
/// cannot be loaded aborts with the error.
pub fn enrich_listing(
    listing: &mut Listing,
    provider: &dyn DistanceProvider,
    stats: &mut EnrichStats,
) -> Result<(), DistanceError> {
    stats.total += 1;

    let Some(point) = listing.location() else {
        stats.missing_coordinates += 1;
        listing.dist_coast = Some(UNKNOWN_DISTANCE);
        listing.dist_water = Some(UNKNOWN_DISTANCE);
        return Ok(());
    };

    if listing.dist_coast.is_none() {
        listing.dist_coast = Some(lookup(listing.id, "coast", provider.coast_distance(point), stats)?);
        stats.coast_computed += 1;
    }

    if listing.dist_water.is_none() {
        listing.dist_water = Some(lookup(listing.id, "water", provider.water_distance(point), stats)?);
        stats.water_computed += 1;
    }

    Ok(())
}

fn lookup(
    id: u64,
    kind: &str,
    result: Result<f64, DistanceError>,
    stats: &mut EnrichStats,
) -> Result<f64, DistanceError> {
    match result {
        Ok(km) => Ok(round_km(km)),
        Err(e) if e.is_data_unavailable() => Err(e),
        Err(e) => {
            log::warn!("Listing {}: {} distance unavailable: {}", id, kind, e);
            stats.failed += 1;
            Ok(UNKNOWN_DISTANCE)
        }
    }
}

/// Enrich every listing, then count those inside `thresholds`
pub fn enrich_all(
    listings: &mut [Listing],
    provider: &dyn DistanceProvider,
    thresholds: &DistanceThresholds,
) -> Result<EnrichStats, DistanceError> {
    let mut stats = EnrichStats::default();

    for listing in listings.iter_mut() {
        enrich_listing(listing, provider, &mut stats)?;
    }

    stats.within_thresholds = listings
        .iter()
        .filter(|l| match (l.dist_coast, l.dist_water) {
            (Some(coast), Some(water)) => thresholds.admits(coast, water),
            _ => false,
        })
        .count();

    Ok(stats)
}
