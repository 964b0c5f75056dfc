//! Tanzania Region Geocoder
//!
//! Translates free-text addresses and region labels into approximate
//! coordinates, and classifies a coordinate back to its nearest
//! administrative region.
//!
//! # Pipeline
//!
//! ```text
//! ResolveRequest ──► AddressResolver ──► [Locality] ─► [Region] ─► UnresolvedLocation
//!                         │                  (85)        (60)
//!                         └── JitterSource (injected)
//!
//! Coordinate ──► RegionClassifier ──► nearest region (haversine)
//!                     ├── strict  (< 150 km, fixed confidence)
//!                     └── approx  (< 200 km, max(20, 100 - d))
//! ```
//!
//! | Component | Module |
//! |-----------|--------|
//! | Gazetteer (regions + localities) | [`gazetteer`] |
//! | Great-circle distance | [`distance`] |
//! | Country bounding box | [`bounds`] |
//! | Forward resolution | [`resolver`] |
//! | Reverse classification | [`classifier`] |
//! | Batch orchestration | [`batch`] |
//!
//! Every component only reads the [`Gazetteer`], which is built once and
//! shared behind an `Arc`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod batch;
pub mod bounds;
pub mod classifier;
pub mod config;
pub mod distance;
pub mod gazetteer;
pub mod jitter;
pub mod resolver;

pub use batch::{BatchReport, BatchResolver};
pub use bounds::{is_within_country_bounds, CountryBounds, TANZANIA_BOUNDS};
pub use classifier::RegionClassifier;
pub use config::{BatchConfig, ClassifierConfig, GeocoderConfig, JitterMode, ResolverConfig};
pub use distance::haversine_km;
pub use gazetteer::Gazetteer;
pub use jitter::{InputHashJitter, JitterSource, NoJitter, SeededJitter};
pub use resolver::{AddressResolver, ResolutionStrategy};

/// Mean Earth radius in km used by the haversine formula
pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeocodeError {
    #[error("no locality or region matched the request")]
    UnresolvedLocation,
    #[error("no region center within threshold (nearest: {nearest:?}, {distance_km:?} km)")]
    Unclassified {
        nearest: Option<String>,
        distance_km: Option<f64>,
    },
    #[error("coordinate ({latitude}, {longitude}) is outside the country bounding box")]
    OutOfBounds { latitude: f64, longitude: f64 },
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, GeocodeError>;

/// Errors raised while reading gazetteer or configuration files
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No usable entries in {0} table")]
    EmptyTable(&'static str),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

/// A point in decimal degrees.
///
/// Any finite pair is representable; whether it lies inside the country is
/// answered by [`CountryBounds`], not by the type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Reject NaN / infinite components
    pub fn validate(&self) -> Result<()> {
        if self.latitude.is_finite() && self.longitude.is_finite() {
            Ok(())
        } else {
            Err(GeocodeError::InvalidInput(format!(
                "non-finite coordinate ({}, {})",
                self.latitude, self.longitude
            )))
        }
    }

    /// Shift by a (latitude, longitude) offset in degrees
    pub fn offset(&self, (dlat, dlon): (f64, f64)) -> Self {
        Self::new(self.latitude + dlat, self.longitude + dlon)
    }

    /// Great-circle distance to `other` in km
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        haversine_km(*self, *other)
    }
}

/// Kind of gazetteer entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaceKind {
    Region,
    Locality,
}

/// Named place with an approximate center
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GazetteerEntry {
    pub name: String,
    pub kind: PlaceKind,
    pub center: Coordinate,
}

impl GazetteerEntry {
    pub fn new(name: impl Into<String>, kind: PlaceKind, center: Coordinate) -> Self {
        Self {
            name: name.into(),
            kind,
            center,
        }
    }
}

/// Input to forward resolution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolveRequest {
    pub address_text: String,
    pub region_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district_label: Option<String>,
}

impl ResolveRequest {
    pub fn new(address_text: impl Into<String>, region_label: impl Into<String>) -> Self {
        Self {
            address_text: address_text.into(),
            region_label: region_label.into(),
            district_label: None,
        }
    }

    pub fn with_district(mut self, district: impl Into<String>) -> Self {
        self.district_label = Some(district.into());
        self
    }

    /// A request is malformed when there is nothing at all to match on
    pub fn validate(&self) -> Result<()> {
        if self.address_text.trim().is_empty() && self.region_label.trim().is_empty() {
            return Err(GeocodeError::InvalidInput(
                "address and region are both empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Outcome of a successful forward resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub coordinate: Coordinate,
    /// Confidence (0-100)
    pub confidence: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_entry_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_kind: Option<PlaceKind>,
}

/// Outcome of a successful reverse classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionClassification {
    pub region: String,
    /// Confidence (0-100)
    pub confidence: u8,
    pub distance_km: f64,
}
