//! Normalized fingerprint distance and the similarity threshold test.

use serde::Serialize;

use super::fingerprint::Fingerprint;
use crate::error::ConfigError;

/// Absorbs rounding in `(1 - t) * L` so exact boundaries stay inclusive.
const BOUNDARY_EPSILON: f64 = 1e-9;

/// Dissimilarity in `[0, 1]`: Hamming distance divided by fingerprint length.
///
/// `None` when the fingerprints are not comparable (different lengths).
pub fn dissimilarity(a: &Fingerprint, b: &Fingerprint) -> Option<f64> {
    let distance = a.hamming_distance(b)?;
    if a.is_empty() {
        return Some(0.0);
    }
    Some(f64::from(distance) / f64::from(a.len()))
}

/// Minimum similarity for two fingerprints to count as the same image.
///
/// Two fingerprints match when `dissimilarity <= 1 - threshold`. A threshold
/// of 1.0 demands identical fingerprints; 0.0 matches everything.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SimilarityThreshold(f64);

impl SimilarityThreshold {
    /// Only bit-identical fingerprints match.
    pub const EXACT: SimilarityThreshold = SimilarityThreshold(1.0);

    /// Every pair matches.
    pub const ANY: SimilarityThreshold = SimilarityThreshold(0.0);

    pub fn new(value: f64) -> Result<Self, ConfigError> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::ValidationError(format!(
                "similarity threshold must be between 0.0 and 1.0, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Largest Hamming distance still accepted for fingerprints of `len` bits.
    pub fn max_distance(self, len: u32) -> u32 {
        let allowed = (1.0 - self.0) * f64::from(len) + BOUNDARY_EPSILON;
        (allowed.floor() as u32).min(len)
    }

    /// Whether `a` and `b` are similar enough to share a cluster.
    pub fn is_similar(self, a: &Fingerprint, b: &Fingerprint) -> bool {
        match a.hamming_distance(b) {
            Some(distance) => distance <= self.max_distance(a.len()),
            None => false,
        }
    }
}

impl Default for SimilarityThreshold {
    fn default() -> Self {
        Self(0.9)
    }
}
