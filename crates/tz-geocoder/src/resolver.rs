//! Forward resolution: address text → coordinate
//!
//! A request runs through an ordered chain of strategies; the first one
//! that produces a result wins. The default chain is
//!
//! 1. [`LocalityMatch`]: a known locality name occurs in the address or
//!    district text (confidence 85, jitter ±0.01°)
//! 2. [`RegionFallback`]: the region label names a gazetteer region
//!    exactly (confidence 60, jitter ±0.1°)
//!
//! and when neither applies the request is `UnresolvedLocation`.

use crate::config::ResolverConfig;
use crate::jitter::JitterSource;
use crate::{Gazetteer, GeocodeError, GeocodeResult, PlaceKind, ResolveRequest, Result};
use std::sync::Arc;
use tracing::debug;

/// One step of the resolution chain
pub trait ResolutionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// `None` passes the request on to the next strategy
    fn try_resolve(
        &self,
        gazetteer: &Gazetteer,
        request: &ResolveRequest,
        jitter: &dyn JitterSource,
    ) -> Option<GeocodeResult>;
}

/// Locality name contained in the address or district text
#[derive(Debug, Clone)]
pub struct LocalityMatch {
    pub confidence: u8,
    pub jitter_degrees: f64,
}

impl ResolutionStrategy for LocalityMatch {
    fn name(&self) -> &'static str {
        "locality"
    }

    fn try_resolve(
        &self,
        gazetteer: &Gazetteer,
        request: &ResolveRequest,
        jitter: &dyn JitterSource,
    ) -> Option<GeocodeResult> {
        // Newline keeps a name from matching across the two fields
        let text = match &request.district_label {
            Some(district) => format!("{}\n{}", request.address_text, district),
            None => request.address_text.clone(),
        };
        let entry = gazetteer.find_locality_contained_in(&text)?;

        Some(GeocodeResult {
            coordinate: entry.center.offset(jitter.offset(request, self.jitter_degrees)),
            confidence: self.confidence,
            matched_entry_name: Some(entry.name.clone()),
            matched_kind: Some(PlaceKind::Locality),
        })
    }
}

/// Exact region label lookup
#[derive(Debug, Clone)]
pub struct RegionFallback {
    pub confidence: u8,
    pub jitter_degrees: f64,
}

impl ResolutionStrategy for RegionFallback {
    fn name(&self) -> &'static str {
        "region"
    }

    fn try_resolve(
        &self,
        gazetteer: &Gazetteer,
        request: &ResolveRequest,
        jitter: &dyn JitterSource,
    ) -> Option<GeocodeResult> {
        let center = gazetteer.region_center(&request.region_label)?;

        Some(GeocodeResult {
            coordinate: center.offset(jitter.offset(request, self.jitter_degrees)),
            confidence: self.confidence,
            matched_entry_name: Some(request.region_label.clone()),
            matched_kind: Some(PlaceKind::Region),
        })
    }
}

/// Locality match followed by region fallback
pub fn default_strategies(config: &ResolverConfig) -> Vec<Box<dyn ResolutionStrategy>> {
    vec![
        Box::new(LocalityMatch {
            confidence: config.locality_confidence,
            jitter_degrees: config.locality_jitter_degrees,
        }),
        Box::new(RegionFallback {
            confidence: config.region_confidence,
            jitter_degrees: config.region_jitter_degrees,
        }),
    ]
}

pub struct AddressResolver {
    gazetteer: Arc<Gazetteer>,
    jitter: Arc<dyn JitterSource>,
    strategies: Vec<Box<dyn ResolutionStrategy>>,
}

impl AddressResolver {
    /// Default chain, jitter source chosen by `config.jitter`
    pub fn new(gazetteer: Arc<Gazetteer>, config: &ResolverConfig) -> Self {
        Self::with_jitter(gazetteer, config, config.jitter.build())
    }

    /// Default chain with an explicit jitter source
    pub fn with_jitter(
        gazetteer: Arc<Gazetteer>,
        config: &ResolverConfig,
        jitter: Arc<dyn JitterSource>,
    ) -> Self {
        Self::with_strategies(gazetteer, jitter, default_strategies(config))
    }

    pub fn with_strategies(
        gazetteer: Arc<Gazetteer>,
        jitter: Arc<dyn JitterSource>,
        strategies: Vec<Box<dyn ResolutionStrategy>>,
    ) -> Self {
        Self {
            gazetteer,
            jitter,
            strategies,
        }
    }

    pub fn gazetteer(&self) -> &Gazetteer {
        &self.gazetteer
    }

    /// Names of the chain steps, in order
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn resolve(&self, request: &ResolveRequest) -> Result<GeocodeResult> {
        request.validate()?;

        for strategy in &self.strategies {
            if let Some(result) =
                strategy.try_resolve(&self.gazetteer, request, self.jitter.as_ref())
            {
                debug!(
                    "Resolved {:?} via {} → {:?} (confidence={})",
                    request.address_text,
                    strategy.name(),
                    result.matched_entry_name,
                    result.confidence
                );
                return Ok(result);
            }
        }

        debug!(
            "Unresolved {:?} (region={:?})",
            request.address_text, request.region_label
        );
        Err(GeocodeError::UnresolvedLocation)
    }
}

impl std::fmt::Debug for AddressResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressResolver")
            .field("strategies", &self.strategy_names())
            .field("gazetteer_entries", &self.gazetteer.len())
            .finish()
    }
}
