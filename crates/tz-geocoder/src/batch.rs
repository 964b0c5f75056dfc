//! Batch forward resolution
//!
//! Each request is resolved on its own; the output has one slot per input,
//! in input order. A malformed or unmatched request only affects its own
//! slot.

use crate::config::BatchConfig;
use crate::resolver::AddressResolver;
use crate::{GeocodeError, GeocodeResult, ResolveRequest, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::thread;
use tracing::info;

#[derive(Debug, Clone)]
pub struct BatchResolver {
    resolver: Arc<AddressResolver>,
    workers: usize,
}

impl BatchResolver {
    pub fn new(resolver: Arc<AddressResolver>, config: &BatchConfig) -> Self {
        Self {
            resolver,
            workers: config.workers.max(1),
        }
    }

    pub fn resolve_batch(&self, requests: &[ResolveRequest]) -> Vec<Result<GeocodeResult>> {
        let results = if self.workers == 1 || requests.len() < 2 {
            self.resolve_chunk(requests)
        } else {
            self.resolve_parallel(requests)
        };

        let report = BatchReport::from_results(&results);
        info!(
            "Batch of {} resolved: {} ok, {} unresolved, {} invalid ({} workers)",
            report.total, report.resolved, report.unresolved, report.invalid, self.workers
        );

        results
    }

    fn resolve_chunk(&self, requests: &[ResolveRequest]) -> Vec<Result<GeocodeResult>> {
        requests.iter().map(|r| self.resolver.resolve(r)).collect()
    }

    /// Contiguous chunks per worker, concatenated back in chunk order
    fn resolve_parallel(&self, requests: &[ResolveRequest]) -> Vec<Result<GeocodeResult>> {
        let chunk_size = requests.len().div_ceil(self.workers);

        thread::scope(|scope| {
            let handles: Vec<_> = requests
                .chunks(chunk_size)
                .map(|chunk| scope.spawn(move || self.resolve_chunk(chunk)))
                .collect();

            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                .collect()
        })
    }
}

/// Outcome counts over a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub total: usize,
    pub resolved: usize,
    pub unresolved: usize,
    pub invalid: usize,
}

impl BatchReport {
    pub fn from_results(results: &[Result<GeocodeResult>]) -> Self {
        let mut report = Self {
            total: results.len(),
            ..Self::default()
        };
        for result in results {
            match result {
                Ok(_) => report.resolved += 1,
                Err(GeocodeError::InvalidInput(_)) => report.invalid += 1,
                Err(_) => report.unresolved += 1,
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolverConfig;
    use crate::jitter::{InputHashJitter, NoJitter};
    use crate::{Gazetteer, PlaceKind};

    fn batch(workers: usize) -> BatchResolver {
        let resolver = AddressResolver::with_jitter(
            Arc::new(Gazetteer::tanzania()),
            &ResolverConfig::default(),
            Arc::new(NoJitter),
        );
        BatchResolver::new(Arc::new(resolver), &BatchConfig { workers })
    }

    fn mixed_requests() -> Vec<ResolveRequest> {
        vec![
            ResolveRequest::new("Kariakoo Market, Ilala", "Dar es Salaam"),
            ResolveRequest::new("", "  "),
            ResolveRequest::new("roadside kiosk", "Katavi"),
            ResolveRequest::new("nowhere", "Atlantis"),
            ResolveRequest::new("Stand", "Kigoma").with_district("Kigoma Ujiji"),
        ]
    }

    fn assert_mixed(results: &[Result<GeocodeResult>]) {
        assert_eq!(results.len(), 5);
        assert_eq!(results[0].as_ref().unwrap().matched_entry_name.as_deref(), Some("Ilala"));
        assert!(matches!(results[1], Err(GeocodeError::InvalidInput(_))));
        assert_eq!(results[2].as_ref().unwrap().matched_kind, Some(PlaceKind::Region));
        assert_eq!(results[3], Err(GeocodeError::UnresolvedLocation));
        assert_eq!(results[4].as_ref().unwrap().matched_entry_name.as_deref(), Some("Kigoma"));
    }

    #[test]
    fn test_sequential_preserves_order_and_isolates_failures() {
        assert_mixed(&batch(1).resolve_batch(&mixed_requests()));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let requests: Vec<_> = mixed_requests().into_iter().cycle().take(53).collect();
        let sequential = batch(1).resolve_batch(&requests);

        for workers in [2, 4, 8, 100] {
            let parallel = batch(workers).resolve_batch(&requests);
            assert_eq!(parallel, sequential, "workers={workers}");
        }
        for chunk in sequential.chunks(5) {
            if chunk.len() == 5 {
                assert_mixed(chunk);
            }
        }
    }

    #[test]
    fn test_input_hash_jitter_is_order_independent() {
        let resolver = AddressResolver::with_jitter(
            Arc::new(Gazetteer::tanzania()),
            &ResolverConfig::default(),
            Arc::new(InputHashJitter::new(5)),
        );
        let batch = BatchResolver::new(Arc::new(resolver), &BatchConfig { workers: 3 });

        let requests = mixed_requests();
        let mut reversed = requests.clone();
        reversed.reverse();

        let forward = batch.resolve_batch(&requests);
        let mut backward = batch.resolve_batch(&reversed);
        backward.reverse();
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_empty_batch() {
        assert!(batch(4).resolve_batch(&[]).is_empty());
    }

    #[test]
    fn test_zero_workers_treated_as_one() {
        assert_mixed(&batch(0).resolve_batch(&mixed_requests()));
    }

    #[test]
    fn test_report_counts() {
        let results = batch(1).resolve_batch(&mixed_requests());
        assert_eq!(
            BatchReport::from_results(&results),
            BatchReport {
                total: 5,
                resolved: 3,
                unresolved: 1,
                invalid: 1
            }
        );
    }
}
