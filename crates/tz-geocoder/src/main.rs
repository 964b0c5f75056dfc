//! Region Geocoder CLI
//!
//! Resolves addresses, classifies coordinates and runs gazetteer checks,
//! printing JSON to stdout. Logs go to stderr.
//!
//! Usage:
//!   tz-geocode resolve --address "Kariakoo Market, Ilala" --region "Dar es Salaam"
//!   tz-geocode classify --lat -6.80 --lon 39.25 --approx
//!   tz-geocode batch --input requests.json
//!   tz-geocode check-gazetteer

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use tz_geocoder::{
    haversine_km, AddressResolver, BatchReport, BatchResolver, Coordinate, Gazetteer,
    GeocodeError, GeocoderConfig, JitterMode, RegionClassifier, ResolveRequest, TANZANIA_BOUNDS,
};

#[derive(Parser, Debug)]
#[command(
    name = "tz-geocode",
    about = "Gazetteer-based geocoding for Tanzanian regions"
)]
struct Args {
    /// Geocoder config JSON (defaults used when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Gazetteer JSON replacing the built-in tables
    #[arg(long, global = true)]
    gazetteer: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve one address to a coordinate
    Resolve {
        #[arg(short, long)]
        address: String,
        #[arg(short, long)]
        region: String,
        #[arg(short, long)]
        district: Option<String>,
        /// Use a reproducible jitter seed instead of the configured mode
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Classify a coordinate to its nearest region
    Classify {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Use the approximate (200 km) regime instead of strict (150 km)
        #[arg(long)]
        approx: bool,
    },
    /// Great-circle distance between two coordinates in km
    Distance {
        #[arg(long, required = true, num_args = 2, allow_hyphen_values = true, value_names = ["LAT", "LON"])]
        from: Vec<f64>,
        #[arg(long, required = true, num_args = 2, allow_hyphen_values = true, value_names = ["LAT", "LON"])]
        to: Vec<f64>,
    },
    /// Check a coordinate against the country bounding box
    Bounds {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
    /// Resolve a JSON array of requests
    Batch {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Verify every entry is in bounds and every region classifies to itself
    CheckGazetteer,
}

/// Per-request batch output slot
#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum BatchItem {
    Resolved(tz_geocoder::GeocodeResult),
    Unresolved,
    Invalid { reason: String },
}

impl From<Result<tz_geocoder::GeocodeResult, GeocodeError>> for BatchItem {
    fn from(result: Result<tz_geocoder::GeocodeResult, GeocodeError>) -> Self {
        match result {
            Ok(r) => Self::Resolved(r),
            Err(GeocodeError::InvalidInput(reason)) => Self::Invalid { reason },
            Err(_) => Self::Unresolved,
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &args.config {
        Some(path) => GeocoderConfig::from_json_file(path)?,
        None => GeocoderConfig::default(),
    };
    let gazetteer = Arc::new(match &args.gazetteer {
        Some(path) => Gazetteer::from_json_file(path)?,
        None => Gazetteer::tanzania(),
    });

    match args.command {
        Command::Resolve {
            address,
            region,
            district,
            seed,
        } => {
            let mut resolver_config = config.resolver.clone();
            if let Some(seed) = seed {
                resolver_config.jitter = JitterMode::Seeded { seed };
            }
            let resolver = AddressResolver::new(gazetteer, &resolver_config);

            let mut request = ResolveRequest::new(address, region);
            request.district_label = district;

            match resolver.resolve(&request) {
                Ok(result) => print_json(&result)?,
                Err(GeocodeError::UnresolvedLocation) => {
                    info!("No locality or region matched");
                    print_json(&serde_json::Value::Null)?;
                }
                Err(e) => bail!(e),
            }
        }
        Command::Classify { lat, lon, approx } => {
            let classifier = RegionClassifier::new(gazetteer, config.classifier);
            let coord = Coordinate::new(lat, lon);
            let result = if approx {
                classifier.classify_approx(&coord)
            } else {
                classifier.classify_strict(&coord)
            };

            match result {
                Ok(classification) => print_json(&classification)?,
                Err(GeocodeError::Unclassified {
                    nearest,
                    distance_km,
                }) => {
                    info!("Unclassified (nearest {:?} at {:?} km)", nearest, distance_km);
                    print_json(&serde_json::Value::Null)?;
                }
                Err(e) => bail!(e),
            }
        }
        Command::Distance { from, to } => {
            let a = Coordinate::new(from[0], from[1]);
            let b = Coordinate::new(to[0], to[1]);
            print_json(&serde_json::json!({ "distance_km": haversine_km(a, b) }))?;
        }
        Command::Bounds { lat, lon } => {
            let coord = Coordinate::new(lat, lon);
            coord.validate()?;
            print_json(&serde_json::json!({
                "in_bounds": TANZANIA_BOUNDS.contains(&coord),
                "bounds": TANZANIA_BOUNDS,
            }))?;
        }
        Command::Batch { input } => {
            info!("Reading requests from {:?}", input);
            let reader = BufReader::new(File::open(&input)?);
            let requests: Vec<ResolveRequest> = serde_json::from_reader(reader)?;

            let resolver = Arc::new(AddressResolver::new(gazetteer, &config.resolver));
            let batch = BatchResolver::new(resolver, &config.batch);
            let results = batch.resolve_batch(&requests);
            let report = BatchReport::from_results(&results);

            let items: Vec<BatchItem> = results.into_iter().map(BatchItem::from).collect();
            print_json(&serde_json::json!({ "report": report, "results": items }))?;
        }
        Command::CheckGazetteer => {
            let out_of_bounds: Vec<&str> = gazetteer
                .out_of_bounds_entries(&TANZANIA_BOUNDS)
                .into_iter()
                .map(|e| e.name.as_str())
                .collect();

            let classifier = RegionClassifier::new(gazetteer.clone(), config.classifier);
            let misclassified: Vec<&str> = gazetteer
                .all_regions()
                .iter()
                .filter(|region| {
                    classifier
                        .classify_strict(&region.center)
                        .map(|c| c.region != region.name)
                        .unwrap_or(true)
                })
                .map(|region| region.name.as_str())
                .collect();

            print_json(&serde_json::json!({
                "entries": gazetteer.len(),
                "out_of_bounds": out_of_bounds,
                "misclassified_regions": misclassified,
            }))?;

            if !out_of_bounds.is_empty() || !misclassified.is_empty() {
                bail!("gazetteer self-consistency check failed");
            }
            info!("Gazetteer consistent ({} entries)", gazetteer.len());
        }
    }

    Ok(())
}
