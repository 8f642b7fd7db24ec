//! Test RNG — deterministic `DeterministicRng` implementations for tests.

use critics_core::rng::DeterministicRng;

/// A no-op RNG that always returns zero. Suitable for tests that do not
/// depend on specific random values.
#[derive(Debug)]
pub struct MockRng;

impl DeterministicRng for MockRng {
    fn next_u128(&mut self) -> u128 {
        0
    }
}

/// An RNG that returns values from a predetermined sequence. Panics if the
/// sequence is exhausted. Used in tests that need specific, repeatable
/// submission ids.
#[derive(Debug)]
pub struct SequenceRng {
    values: Vec<u128>,
    index: usize,
}

impl SequenceRng {
    /// Create a new `SequenceRng` with the given values.
    #[must_use]
    pub fn new(values: Vec<u128>) -> Self {
        Self { values, index: 0 }
    }
}

impl DeterministicRng for SequenceRng {
    fn next_u128(&mut self) -> u128 {
        let val = self.values[self.index];
        self.index += 1;
        val
    }
}
