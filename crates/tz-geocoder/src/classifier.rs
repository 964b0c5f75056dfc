//! Reverse classification: coordinate → nearest region
//!
//! Both regimes pick the region whose center is nearest by haversine
//! distance, and differ only in cutoff and confidence:
//!
//! | Regime | Cutoff | Confidence |
//! |--------|--------|------------|
//! | strict | < 150 km | fixed (`strict_confidence`) |
//! | approx | < 200 km | `max(20, 100 - d)` rounded |
//!
//! Strict is meant for assigning records to a region, approx for labelling
//! arbitrary map points.
//!
//! Ties within `tie_epsilon_km` go to the region listed first in the
//! gazetteer.

use crate::config::ClassifierConfig;
use crate::distance::haversine_km;
use crate::{Coordinate, Gazetteer, GazetteerEntry, GeocodeError, RegionClassification, Result};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct RegionClassifier {
    gazetteer: Arc<Gazetteer>,
    config: ClassifierConfig,
}

impl RegionClassifier {
    pub fn new(gazetteer: Arc<Gazetteer>, config: ClassifierConfig) -> Self {
        Self { gazetteer, config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Nearest region center and its distance in km
    pub fn nearest(&self, coord: &Coordinate) -> Option<(&GazetteerEntry, f64)> {
        let mut best: Option<(&GazetteerEntry, f64)> = None;

        for region in self.gazetteer.all_regions() {
            let d = haversine_km(*coord, region.center);
            match best {
                // earlier entry keeps near-ties
                Some((_, best_d)) if d >= best_d - self.config.tie_epsilon_km => {}
                _ => best = Some((region, d)),
            }
        }

        best
    }

    /// Assign to the nearest region when it is under the strict cutoff
    pub fn classify_strict(&self, coord: &Coordinate) -> Result<RegionClassification> {
        self.classify_within(coord, self.config.strict_threshold_km, |_| {
            self.config.strict_confidence.min(100)
        })
    }

    /// Best-guess label with distance-scaled confidence
    pub fn classify_approx(&self, coord: &Coordinate) -> Result<RegionClassification> {
        let floor = f64::from(self.config.approx_min_confidence.min(100));
        self.classify_within(coord, self.config.approx_threshold_km, |d| {
            (100.0 - d).round().clamp(floor, 100.0) as u8
        })
    }

    fn classify_within(
        &self,
        coord: &Coordinate,
        threshold_km: f64,
        confidence: impl Fn(f64) -> u8,
    ) -> Result<RegionClassification> {
        coord.validate()?;

        let (region, distance_km) = self.nearest(coord).ok_or(GeocodeError::Unclassified {
            nearest: None,
            distance_km: None,
        })?;

        if distance_km >= threshold_km {
            debug!(
                "Unclassified ({}, {}): nearest {} at {:.1} km (cutoff {:.0} km)",
                coord.latitude, coord.longitude, region.name, distance_km, threshold_km
            );
            return Err(GeocodeError::Unclassified {
                nearest: Some(region.name.clone()),
                distance_km: Some(distance_km),
            });
        }

        debug!(
            "Classified ({}, {}) as {} at {:.1} km",
            coord.latitude, coord.longitude, region.name, distance_km
        );

        Ok(RegionClassification {
            region: region.name.clone(),
            confidence: confidence(distance_km),
            distance_km,
        })
    }
}
