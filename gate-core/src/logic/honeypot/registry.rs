//! Honeypot Registry
//!
//! Holds the trap field names and the synthetic trap vectors and answers
//! membership queries. The vectors are drawn from the OS random source once
//! and never regenerated: a returning prober must keep hitting the same
//! traps.
//!
//! Vector matching is exact elementwise equality. A vector that differs in
//! the last bit of one element is not a hit.

use std::collections::HashSet;

use rand::rngs::{OsRng, StdRng};
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::logic::features::FeatureVector;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Random source unavailable for trap generation: {0}")]
    Randomness(#[from] rand::Error),
}

/// Immutable set of trap signatures.
#[derive(Debug, Clone)]
pub struct HoneypotRegistry {
    fields: HashSet<String>,
    vectors: Vec<FeatureVector>,
}

impl HoneypotRegistry {
    /// Build a registry with `vector_count` trap vectors of `width` elements
    /// drawn from the OS random source.
    pub fn generate<I, S>(fields: I, vector_count: usize, width: usize) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut rng = StdRng::from_rng(OsRng)?;
        let registry = Self::build(fields, vector_count, width, &mut rng);

        log::info!(
            "Honeypot registry ready: {} trap fields, {} trap vectors of width {}",
            registry.fields.len(),
            registry.vectors.len(),
            width
        );

        Ok(registry)
    }

    /// Deterministic registry for tests and reproducible deployments.
    pub fn with_seed<I, S>(fields: I, vector_count: usize, width: usize, seed: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::build(fields, vector_count, width, &mut rng)
    }

    fn build<I, S>(fields: I, vector_count: usize, width: usize, rng: &mut StdRng) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let vectors = (0..vector_count)
            .map(|_| FeatureVector::from_values((0..width).map(|_| rng.gen::<f64>()).collect()))
            .collect();

        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            vectors,
        }
    }

    /// True if `name` is a reserved trap key.
    pub fn is_trap_field(&self, name: &str) -> bool {
        self.fields.contains(name)
    }

    /// True if any of `keys` is a reserved trap key.
    pub fn contains_trap_field<'a, I>(&self, keys: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        keys.into_iter().any(|key| self.is_trap_field(key))
    }

    /// True if `vector` is exactly one of the trap vectors.
    pub fn is_trap_vector(&self, vector: &FeatureVector) -> bool {
        self.vectors.iter().any(|trap| trap == vector)
    }

    pub fn trap_vectors(&self) -> &[FeatureVector] {
        &self.vectors
    }

    /// Number of reserved trap keys
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}
