use anyhow::{Context, Result};
use std::path::Path;

use crate::listing::Listing;

/// Read a JSON array of listings
pub fn read_listings(input_path: &Path) -> Result<Vec<Listing>> {
    let content = std::fs::read_to_string(input_path)
        .with_context(|| format!("Failed to read listings from {}", input_path.display()))?;

    let listings: Vec<Listing> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse listings JSON from {}", input_path.display()))?;

    log::info!("Read {} listings from {}", listings.len(), input_path.display());
    Ok(listings)
}

/// Write listings as a pretty-printed JSON array
pub fn write_listings(listings: &[Listing], output_path: &Path) -> Result<()> {
    log::info!("Writing {} listings to {}", listings.len(), output_path.display());

    let json_string = serde_json::to_string_pretty(listings)
        .context("Failed to serialize listings")?;

    std::fs::write(output_path, json_string)
        .with_context(|| format!("Failed to write listings to {}", output_path.display()))?;

    Ok(())
}
