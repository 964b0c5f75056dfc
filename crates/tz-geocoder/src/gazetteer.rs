//! Reference gazetteer of regions and localities
//!
//! Two ordered tables: administrative regions and localities (cities and
//! urban districts). Order is significant:
//!
//! - locality lookup returns the first entry whose name occurs in the
//!   searched text, so more specific names (Dar es Salaam districts) come
//!   before towns, and `Kigoma` precedes `Tanga` so "Lake Tanganyika"
//!   addresses do not land on Tanga;
//! - region classification breaks distance ties in favor of the earlier
//!   region.
//!
//! A gazetteer is immutable once built. Share it behind an `Arc`.

use crate::bounds::CountryBounds;
use crate::{Coordinate, GazetteerEntry, LoadError, PlaceKind};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{info, warn};

/// Region centers (regional capitals), alphabetical
const REGIONS: &[(&str, f64, f64)] = &[
    ("Arusha", -3.3869, 36.6830),
    ("Dar es Salaam", -6.7924, 39.2083),
    ("Dodoma", -6.1630, 35.7516),
    ("Geita", -2.8667, 32.1667),
    ("Iringa", -7.7700, 35.6900),
    ("Kagera", -1.3317, 31.8122),
    ("Katavi", -6.5000, 31.0000),
    ("Kigoma", -4.8769, 29.6267),
    ("Kilimanjaro", -3.3348, 37.3404),
    ("Lindi", -9.9970, 39.7140),
    ("Manyara", -4.2117, 35.7500),
    ("Mara", -1.5000, 33.8000),
    ("Mbeya", -8.9094, 33.4608),
    ("Morogoro", -6.8211, 37.6595),
    ("Mtwara", -10.2692, 40.1836),
    ("Mwanza", -2.5164, 32.9175),
    ("Njombe", -9.3333, 34.7667),
    ("Pwani", -6.7667, 38.9167),
    ("Rukwa", -7.9667, 31.6167),
    ("Ruvuma", -10.6833, 35.6500),
    ("Shinyanga", -3.6619, 33.4231),
    ("Simiyu", -2.8000, 33.9833),
    ("Singida", -4.8167, 34.7500),
    ("Songwe", -9.1000, 32.9333),
    ("Tabora", -5.0167, 32.8000),
    ("Tanga", -5.0689, 39.0988),
];

/// Locality centers, most specific first
const LOCALITIES: &[(&str, f64, f64)] = &[
    // Dar es Salaam districts
    ("Ilala", -6.8161, 39.2803),
    ("Kinondoni", -6.7735, 39.2414),
    ("Temeke", -6.8667, 39.2500),
    ("Ubungo", -6.7833, 39.2000),
    ("Kigamboni", -6.8500, 39.3167),
    // Towns and cities
    ("Zanzibar", -6.1659, 39.2026),
    ("Arusha", -3.3869, 36.6830),
    ("Moshi", -3.3348, 37.3404),
    ("Mwanza", -2.5164, 32.9175),
    ("Dodoma", -6.1630, 35.7516),
    ("Mbeya", -8.9094, 33.4608),
    ("Morogoro", -6.8211, 37.6595),
    ("Kigoma", -4.8769, 29.6267),
    ("Tanga", -5.0689, 39.0988),
    ("Tabora", -5.0167, 32.8000),
    ("Iringa", -7.7700, 35.6900),
    ("Songea", -10.6833, 35.6500),
    ("Musoma", -1.5000, 33.8000),
    ("Bukoba", -1.3317, 31.8122),
    ("Shinyanga", -3.6619, 33.4231),
    ("Kahama", -3.8333, 32.6000),
    ("Sumbawanga", -7.9667, 31.6167),
    ("Bagamoyo", -6.4333, 38.9000),
    ("Mtwara", -10.2692, 40.1836),
];

#[derive(Debug, Clone)]
pub struct Gazetteer {
    regions: Vec<GazetteerEntry>,
    localities: Vec<GazetteerEntry>,
    /// Lowercased locality names, parallel to `localities`
    locality_keys: Vec<String>,
}

impl Gazetteer {
    /// Build from ordered entries. Entry kinds are taken from the table they
    /// are placed in; entries with a blank name are dropped, since an empty
    /// key would be contained in every address.
    pub fn new(regions: Vec<GazetteerEntry>, localities: Vec<GazetteerEntry>) -> Self {
        fn named(entries: Vec<GazetteerEntry>, kind: PlaceKind) -> Vec<GazetteerEntry> {
            entries
                .into_iter()
                .filter(|e| {
                    let keep = !e.name.trim().is_empty();
                    if !keep {
                        warn!("Dropping {:?} entry with blank name", kind);
                    }
                    keep
                })
                .map(|e| GazetteerEntry { kind, ..e })
                .collect()
        }

        let regions = named(regions, PlaceKind::Region);
        let localities = named(localities, PlaceKind::Locality);
        let locality_keys = localities.iter().map(|e| e.name.to_lowercase()).collect();

        Self {
            regions,
            localities,
            locality_keys,
        }
    }

    /// Built-in Tanzania tables
    pub fn tanzania() -> Self {
        fn build(table: &[(&str, f64, f64)], kind: PlaceKind) -> Vec<GazetteerEntry> {
            table
                .iter()
                .map(|&(name, lat, lon)| GazetteerEntry::new(name, kind, Coordinate::new(lat, lon)))
                .collect()
        }

        Self::new(
            build(REGIONS, PlaceKind::Region),
            build(LOCALITIES, PlaceKind::Locality),
        )
    }

    /// First locality (in table order) whose name occurs in `text`,
    /// case-insensitively
    pub fn find_locality_contained_in(&self, text: &str) -> Option<&GazetteerEntry> {
        let haystack = text.to_lowercase();
        self.locality_keys
            .iter()
            .position(|key| haystack.contains(key.as_str()))
            .map(|i| &self.localities[i])
    }

    /// Exact, case-sensitive region lookup
    pub fn region_center(&self, name: &str) -> Option<Coordinate> {
        self.regions
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.center)
    }

    /// Exact, case-sensitive locality lookup
    pub fn locality(&self, name: &str) -> Option<&GazetteerEntry> {
        self.localities.iter().find(|e| e.name == name)
    }

    pub fn all_regions(&self) -> &[GazetteerEntry] {
        &self.regions
    }

    pub fn all_localities(&self) -> &[GazetteerEntry] {
        &self.localities
    }

    /// Regions then localities, each in table order
    pub fn entries(&self) -> impl Iterator<Item = &GazetteerEntry> {
        self.regions.iter().chain(self.localities.iter())
    }

    pub fn len(&self) -> usize {
        self.regions.len() + self.localities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries whose center falls outside `bounds`
    pub fn out_of_bounds_entries(&self, bounds: &CountryBounds) -> Vec<&GazetteerEntry> {
        self.entries()
            .filter(|e| !bounds.contains(&e.center))
            .collect()
    }

    /// Load tables from a JSON file of the form
    /// `{"regions": [{"name", "latitude", "longitude"}], "localities": [...]}`.
    ///
    /// Rows with a blank name or a missing/non-finite coordinate are skipped.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        info!("Loading gazetteer from {:?}", path);

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let raw: RawGazetteer = serde_json::from_reader(reader)?;

        let regions = collect_rows(raw.regions, PlaceKind::Region);
        if regions.is_empty() {
            return Err(LoadError::EmptyTable("regions"));
        }
        let localities = collect_rows(raw.localities, PlaceKind::Locality);

        info!(
            "Loaded {} regions and {} localities",
            regions.len(),
            localities.len()
        );

        Ok(Self::new(regions, localities))
    }
}

impl Default for Gazetteer {
    fn default() -> Self {
        Self::tanzania()
    }
}

/// Raw gazetteer row from JSON
#[derive(Debug, Deserialize)]
struct RawEntry {
    name: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawGazetteer {
    #[serde(default)]
    regions: Vec<RawEntry>,
    #[serde(default)]
    localities: Vec<RawEntry>,
}

fn collect_rows(rows: Vec<RawEntry>, kind: PlaceKind) -> Vec<GazetteerEntry> {
    let mut entries = Vec::with_capacity(rows.len());
    let mut skipped = 0;

    for (i, row) in rows.into_iter().enumerate() {
        let name = match row.name.map(|n| n.trim().to_string()) {
            Some(n) if !n.is_empty() => n,
            _ => {
                warn!("Skipping {:?} row {}: missing name", kind, i);
                skipped += 1;
                continue;
            }
        };
        let center = match (row.latitude, row.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                Coordinate::new(lat, lon)
            }
            _ => {
                warn!("Skipping {:?} {:?}: missing or invalid coordinates", kind, name);
                skipped += 1;
                continue;
            }
        };
        entries.push(GazetteerEntry::new(name, kind, center));
    }

    if skipped > 0 {
        info!("{} {:?} rows skipped", skipped, kind);
    }

    entries
}
