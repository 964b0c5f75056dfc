//! Positional jitter sources
//!
//! Gazetteer centers are coarse, so resolved coordinates get a small
//! bounded offset. Where that offset comes from is injected:
//!
//! | Source | Behavior |
//! |--------|----------|
//! | [`NoJitter`] | zero offset, exact centers |
//! | [`SeededJitter`] | PRNG stream, reproducible for a fixed seed |
//! | [`SeededJitter::from_entropy`] | PRNG stream, different every run |
//! | [`InputHashJitter`] | derived from the request text, same input → same offset |

use crate::ResolveRequest;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Largest accepted jitter bound in degrees; larger bounds are capped
pub const MAX_JITTER_DEGREES: f64 = 1.0;

pub trait JitterSource: Send + Sync {
    /// Offset `(dlat, dlon)` in degrees, each component within
    /// `[-max_degrees, max_degrees]`
    fn offset(&self, request: &ResolveRequest, max_degrees: f64) -> (f64, f64);
}

fn sample<R: Rng + ?Sized>(rng: &mut R, max_degrees: f64) -> (f64, f64) {
    if !max_degrees.is_finite() || max_degrees <= 0.0 {
        return (0.0, 0.0);
    }
    let max_degrees = max_degrees.min(MAX_JITTER_DEGREES);
    (
        rng.gen_range(-max_degrees..=max_degrees),
        rng.gen_range(-max_degrees..=max_degrees),
    )
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl JitterSource for NoJitter {
    fn offset(&self, _request: &ResolveRequest, _max_degrees: f64) -> (f64, f64) {
        (0.0, 0.0)
    }
}

/// Shared PRNG stream. Concurrent callers serialize on the lock, so with a
/// fixed seed the sequence is reproducible only for sequential use.
#[derive(Debug)]
pub struct SeededJitter {
    rng: Mutex<StdRng>,
}

impl SeededJitter {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }
}

impl JitterSource for SeededJitter {
    fn offset(&self, _request: &ResolveRequest, max_degrees: f64) -> (f64, f64) {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        sample(&mut *rng, max_degrees)
    }
}

/// Offset derived from the request fields, independent of call order and
/// thread scheduling
#[derive(Debug, Clone, Copy, Default)]
pub struct InputHashJitter {
    seed: u64,
}

impl InputHashJitter {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn key(&self, request: &ResolveRequest) -> u64 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(request.address_text.as_bytes());
        hasher.update(&[0x1f]);
        hasher.update(request.region_label.as_bytes());
        hasher.update(&[0x1f]);
        if let Some(district) = &request.district_label {
            hasher.update(district.as_bytes());
        }
        self.seed ^ u64::from(hasher.finalize())
    }
}

impl JitterSource for InputHashJitter {
    fn offset(&self, request: &ResolveRequest, max_degrees: f64) -> (f64, f64) {
        let mut rng = StdRng::seed_from_u64(self.key(request));
        sample(&mut rng, max_degrees)
    }
}
