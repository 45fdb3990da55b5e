//! Uniform random sources.
//!
//! The roll algorithm only needs a value in `[0, 1)`. Anything that can
//! produce one implements [`RandomSource`]: a seeded `StdRng`, a fixed
//! sequence of draws for deterministic tests, or a plain closure.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A source of uniform draws in `[0, 1)`.
pub trait RandomSource {
    /// Next uniform draw in `[0, 1)`.
    fn uniform(&mut self) -> f64;

    /// Pick an index with probability proportional to `weights`.
    ///
    /// Returns `None` for an empty slice or if any weight is not strictly
    /// positive. Falls back to the last index if accumulated floating point
    /// error prevents an earlier pick.
    fn weighted_index(&mut self, weights: &[f64]) -> Option<usize> {
        if weights.is_empty() || weights.iter().any(|w| w.is_nan() || *w <= 0.0) {
            return None;
        }
        let total: f64 = weights.iter().sum();
        let mut remaining = self.uniform() * total;
        for (i, weight) in weights.iter().enumerate() {
            remaining -= weight;
            if remaining <= 0.0 {
                return Some(i);
            }
        }
        Some(weights.len() - 1)
    }
}

impl<F> RandomSource for F
where
    F: FnMut() -> f64,
{
    fn uniform(&mut self) -> f64 {
        self()
    }
}

/// `StdRng`-backed source, reproducible when seeded.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    /// Deterministic source for a given seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Source seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn uniform(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Replays a fixed list of draws, cycling when exhausted.
///
/// Values are clamped into `[0, 1)`. An empty list always yields `0.0`.
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    values: Vec<f64>,
    index: usize,
}

impl SequenceRandom {
    /// Create a source replaying `values` in order.
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
            index: 0,
        }
    }

    /// A source that always returns `value`.
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }

    /// Number of draws taken so far.
    pub fn draws(&self) -> usize {
        self.index
    }
}

impl RandomSource for SequenceRandom {
    fn uniform(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.index % self.values.len()];
        self.index += 1;
        value.clamp(0.0, 1.0 - f64::EPSILON)
    }
}
