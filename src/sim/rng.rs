//! Random sources
//!
//! The engine draws through `RandomSource` so tests can script exact
//! outcomes. Live sessions use a seeded PCG stream.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Source of uniform draws for outcomes and reel timing
pub trait RandomSource {
    /// Uniform index in `0..n` (`n > 0`)
    fn next_index(&mut self, n: usize) -> usize;
    /// Uniform value in `[0, 1)`
    fn next_unit(&mut self) -> f32;
}

impl RandomSource for Pcg32 {
    fn next_index(&mut self, n: usize) -> usize {
        self.random_range(0..n)
    }

    fn next_unit(&mut self) -> f32 {
        self.random::<f32>()
    }
}

/// RNG seed wrapper for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    pub fn to_rng(&self) -> Pcg32 {
        if self.stream == 0 {
            Pcg32::seed_from_u64(self.seed)
        } else {
            Pcg32::new(self.seed, self.stream)
        }
    }
}

/// Replays fixed sequences, cycling when exhausted
///
/// Indices are reduced modulo the requested range; an empty sequence always
/// yields 0.
#[derive(Debug, Clone, Default)]
pub struct SequenceSource {
    indices: Vec<usize>,
    units: Vec<f32>,
    next_index: usize,
    next_unit: usize,
}

impl SequenceSource {
    pub fn new(indices: Vec<usize>, units: Vec<f32>) -> Self {
        Self {
            indices,
            units,
            next_index: 0,
            next_unit: 0,
        }
    }

    /// Only index draws scripted; timing draws are 0
    pub fn indices(indices: Vec<usize>) -> Self {
        Self::new(indices, Vec::new())
    }

    /// Queue more index draws after the current sequence
    pub fn push_indices(&mut self, more: impl IntoIterator<Item = usize>) {
        self.indices.extend(more);
    }
}

impl RandomSource for SequenceSource {
    fn next_index(&mut self, n: usize) -> usize {
        if self.indices.is_empty() || n == 0 {
            return 0;
        }
        let value = self.indices[self.next_index % self.indices.len()];
        self.next_index += 1;
        value % n
    }

    fn next_unit(&mut self) -> f32 {
        if self.units.is_empty() {
            return 0.0;
        }
        let value = self.units[self.next_unit % self.units.len()];
        self.next_unit += 1;
        value.clamp(0.0, 1.0 - f32::EPSILON)
    }
}
