//! Geocoder configuration
//!
//! Every field has a default, so a JSON file only needs the keys it
//! overrides:
//!
//! ```json
//! {
//!   "resolver": { "jitter": { "mode": "input_hash", "seed": 7 } },
//!   "classifier": { "strict_confidence": 95 },
//!   "batch": { "workers": 4 }
//! }
//! ```

use crate::jitter::{InputHashJitter, JitterSource, NoJitter, SeededJitter, MAX_JITTER_DEGREES};
use crate::LoadError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Confidence for a locality match
pub const LOCALITY_CONFIDENCE: u8 = 85;
/// Confidence for a region-only match
pub const REGION_CONFIDENCE: u8 = 60;
/// Locality jitter bound in degrees (~1 km)
pub const LOCALITY_JITTER_DEGREES: f64 = 0.01;
/// Region jitter bound in degrees (~10 km)
pub const REGION_JITTER_DEGREES: f64 = 0.1;

/// Strict classification cutoff in km
pub const STRICT_THRESHOLD_KM: f64 = 150.0;
/// Confidence reported by a strict classification
pub const STRICT_CONFIDENCE: u8 = 90;
/// Approximate classification cutoff in km
pub const APPROX_THRESHOLD_KM: f64 = 200.0;
/// Confidence floor for approximate classification
pub const APPROX_MIN_CONFIDENCE: u8 = 20;
/// Distances closer than this are treated as ties
pub const TIE_EPSILON_KM: f64 = 1e-6;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub resolver: ResolverConfig,
    pub classifier: ClassifierConfig,
    pub batch: BatchConfig,
}

impl GeocoderConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        info!("Loading geocoder config from {:?}", path);

        let file = File::open(path)?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LoadError> {
        self.resolver.validate()?;
        self.classifier.validate()
    }
}

fn check_confidence(field: &str, value: u8) -> Result<(), LoadError> {
    if value > 100 {
        return Err(LoadError::InvalidConfig(format!(
            "{field} must be 0-100, got {value}"
        )));
    }
    Ok(())
}

fn check_range(field: &str, value: f64, max: f64) -> Result<(), LoadError> {
    if !(0.0..=max).contains(&value) {
        return Err(LoadError::InvalidConfig(format!(
            "{field} must be within [0, {max}], got {value}"
        )));
    }
    Ok(())
}

/// How resolved coordinates are jittered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum JitterMode {
    /// Exact gazetteer centers
    None,
    /// Fresh random seed per resolver
    #[default]
    Entropy,
    /// Reproducible PRNG stream
    Seeded { seed: u64 },
    /// Offset derived from the request text
    InputHash { seed: u64 },
}

impl JitterMode {
    pub fn build(&self) -> Arc<dyn JitterSource> {
        match *self {
            Self::None => Arc::new(NoJitter),
            Self::Entropy => Arc::new(SeededJitter::from_entropy()),
            Self::Seeded { seed } => Arc::new(SeededJitter::new(seed)),
            Self::InputHash { seed } => Arc::new(InputHashJitter::new(seed)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub locality_confidence: u8,
    pub region_confidence: u8,
    pub locality_jitter_degrees: f64,
    pub region_jitter_degrees: f64,
    pub jitter: JitterMode,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            locality_confidence: LOCALITY_CONFIDENCE,
            region_confidence: REGION_CONFIDENCE,
            locality_jitter_degrees: LOCALITY_JITTER_DEGREES,
            region_jitter_degrees: REGION_JITTER_DEGREES,
            jitter: JitterMode::default(),
        }
    }
}

impl ResolverConfig {
    pub fn validate(&self) -> Result<(), LoadError> {
        check_confidence("locality_confidence", self.locality_confidence)?;
        check_confidence("region_confidence", self.region_confidence)?;
        check_range(
            "locality_jitter_degrees",
            self.locality_jitter_degrees,
            MAX_JITTER_DEGREES,
        )?;
        check_range(
            "region_jitter_degrees",
            self.region_jitter_degrees,
            MAX_JITTER_DEGREES,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub strict_threshold_km: f64,
    pub strict_confidence: u8,
    pub approx_threshold_km: f64,
    pub approx_min_confidence: u8,
    pub tie_epsilon_km: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            strict_threshold_km: STRICT_THRESHOLD_KM,
            strict_confidence: STRICT_CONFIDENCE,
            approx_threshold_km: APPROX_THRESHOLD_KM,
            approx_min_confidence: APPROX_MIN_CONFIDENCE,
            tie_epsilon_km: TIE_EPSILON_KM,
        }
    }
}

impl ClassifierConfig {
    pub fn validate(&self) -> Result<(), LoadError> {
        check_confidence("strict_confidence", self.strict_confidence)?;
        check_confidence("approx_min_confidence", self.approx_min_confidence)?;
        check_range("strict_threshold_km", self.strict_threshold_km, f64::MAX)?;
        check_range("approx_threshold_km", self.approx_threshold_km, f64::MAX)?;
        check_range("tie_epsilon_km", self.tie_epsilon_km, f64::MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// 1 resolves sequentially on the calling thread
    pub workers: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { workers: 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ResolveRequest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = GeocoderConfig::default();
        assert_eq!(config.resolver.locality_confidence, 85);
        assert_eq!(config.resolver.region_confidence, 60);
        assert_eq!(config.resolver.jitter, JitterMode::Entropy);
        assert_eq!(config.classifier.strict_threshold_km, 150.0);
        assert_eq!(config.classifier.approx_threshold_km, 200.0);
        assert_eq!(config.batch.workers, 1);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{
            "resolver": { "jitter": { "mode": "input_hash", "seed": 7 } },
            "classifier": { "strict_confidence": 95 }
        }"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let config = GeocoderConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.resolver.jitter, JitterMode::InputHash { seed: 7 });
        assert_eq!(config.resolver.locality_confidence, 85);
        assert_eq!(config.classifier.strict_confidence, 95);
        assert_eq!(config.classifier.strict_threshold_km, 150.0);
        assert_eq!(config.batch, BatchConfig::default());
    }

    #[test]
    fn test_jitter_mode_parsing() {
        let none: JitterMode = serde_json::from_str(r#"{"mode": "none"}"#).unwrap();
        assert_eq!(none, JitterMode::None);
        let seeded: JitterMode = serde_json::from_str(r#"{"mode": "seeded", "seed": 3}"#).unwrap();
        assert_eq!(seeded, JitterMode::Seeded { seed: 3 });
    }

    #[test]
    fn test_jitter_mode_build() {
        let r = ResolveRequest::new("Plot 1", "Mara");
        assert_eq!(JitterMode::None.build().offset(&r, 0.1), (0.0, 0.0));

        let a = JitterMode::InputHash { seed: 1 }.build();
        let b = JitterMode::InputHash { seed: 1 }.build();
        assert_eq!(a.offset(&r, 0.1), b.offset(&r, 0.1));
    }

    fn load(json: &str) -> Result<GeocoderConfig, LoadError> {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        GeocoderConfig::from_json_file(file.path())
    }

    #[test]
    fn test_defaults_validate() {
        assert!(GeocoderConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let bad = [
            r#"{"classifier": {"approx_min_confidence": 150}}"#,
            r#"{"classifier": {"strict_confidence": 101}}"#,
            r#"{"classifier": {"strict_threshold_km": -1.0}}"#,
            r#"{"classifier": {"tie_epsilon_km": -0.5}}"#,
            r#"{"resolver": {"locality_confidence": 250}}"#,
            r#"{"resolver": {"region_confidence": 101}}"#,
            r#"{"resolver": {"region_jitter_degrees": 1e308}}"#,
            r#"{"resolver": {"locality_jitter_degrees": -0.01}}"#,
        ];

        for json in bad {
            assert!(
                matches!(load(json), Err(LoadError::InvalidConfig(_))),
                "accepted {json}"
            );
        }
    }

    #[test]
    fn test_non_finite_jitter_rejected() {
        let config = ResolverConfig {
            region_jitter_degrees: f64::NAN,
            ..ResolverConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ResolverConfig {
            locality_jitter_degrees: f64::INFINITY,
            ..ResolverConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_boundary_values_accepted() {
        let config = load(
            r#"{"resolver": {"locality_confidence": 100, "region_jitter_degrees": 1.0},
                "classifier": {"approx_min_confidence": 100}}"#,
        )
        .unwrap();
        assert_eq!(config.resolver.locality_confidence, 100);
    }

    #[test]
    fn test_invalid_json_is_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        assert!(matches!(
            GeocoderConfig::from_json_file(file.path()),
            Err(LoadError::Json(_))
        ));
    }
}
