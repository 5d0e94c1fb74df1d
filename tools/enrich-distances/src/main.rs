use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use immo_geodist::{DistanceCalculator, DistanceConfig};
use std::path::PathBuf;

mod listing;
mod output;

use listing::enrich_all;
use output::{read_listings, write_listings};

#[derive(Parser, Debug)]
#[command(
    name = "enrich-distances",
    author,
    version,
    about = "Fill coast and water distances on property listings",
    long_about = "Computes the distance from each listing to the nearest coastline and to \
                  the nearest river or lake edge, in kilometres.\n\n\
                  Dataset paths come from --config, then the COASTLINE_PATH / WATERLINES_PATH \
                  environment variables, then the --coastline / --water-lines flags."
)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Coastline GeoJSON (one polygon feature)
    #[arg(long, global = true)]
    coastline: Option<PathBuf>,

    /// Water lines GeoJSON (line features)
    #[arg(long, global = true)]
    water_lines: Option<PathBuf>,

    /// Verbose output (show debug messages)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Distances for a single position
    Point {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Compute only one of the two distances
        #[arg(long, value_enum)]
        only: Option<Only>,
    },

    /// Fill missing distances on a JSON array of listings
    Enrich {
        /// Input listings JSON
        #[arg(short, long)]
        input: PathBuf,

        /// Output listings JSON
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Only {
    Coast,
    Water,
}

/// Defaults, then the config file, then the environment, then flags
fn resolve_config(args: &Args) -> Result<DistanceConfig> {
    let mut config = match &args.config {
        Some(path) => DistanceConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?
            .with_env_overrides(),
        None => DistanceConfig::from_env(),
    }
    .context("Invalid environment configuration")?;

    if let Some(path) = &args.coastline {
        config.coastline_path = path.clone();
    }
    if let Some(path) = &args.water_lines {
        config.water_lines_path = path.clone();
    }

    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "debug" } else { "info" }),
    )
    .format_timestamp(None)
    .init();

    let config = resolve_config(&args)?;
    log::info!("Coastline:   {}", config.coastline_path.display());
    log::info!("Water lines: {}", config.water_lines_path.display());

    let calculator = DistanceCalculator::new(config).context("Failed to set up distance calculator")?;

    match args.command {
        Command::Point { lat, lon, only } => {
            match only {
                Some(Only::Coast) => {
                    let coast = calculator.calculate_coast_distance(lat, lon)?;
                    println!("coast_km\t{:.3}", coast);
                }
                Some(Only::Water) => {
                    let water = calculator.calculate_water_distance(lat, lon)?;
                    println!("water_km\t{:.3}", water);
                }
                None => {
                    let (coast, water) = calculator.calculate_both_distances(lat, lon)?;
                    println!("coast_km\t{:.3}", coast);
                    println!("water_km\t{:.3}", water);
                }
            }
        }

        Command::Enrich { input, output } => {
            let mut listings = read_listings(&input)?;

            let stats = enrich_all(&mut listings, &calculator, &calculator.config().thresholds)
                .context("Distance enrichment aborted")?;

            write_listings(&listings, &output)?;

            log::info!("");
            stats.log_summary();
            log::info!("Output written to: {}", output.display());
        }
    }

    Ok(())
}
