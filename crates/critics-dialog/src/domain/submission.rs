//! Submission tokens.

use std::fmt;

use critics_core::rng::DeterministicRng;

/// Opaque token identifying a critique: 128 random bits rendered as 32
/// lowercase hexadecimal characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubmissionId(String);

impl SubmissionId {
    /// Draws a fresh token from `rng`.
    pub fn generate(rng: &mut dyn DeterministicRng) -> Self {
        Self::from_bits(rng.next_u128())
    }

    /// Renders a token from raw bits.
    #[must_use]
    pub fn from_bits(bits: u128) -> Self {
        Self(format!("{bits:032x}"))
    }

    /// The token text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
