//! Pairwise ranking accuracy
//!
//! Validation pairs hold two comments where annotators judged one more
//! toxic than the other. A pair is ranked correctly when the model scores
//! the less toxic comment strictly below the more toxic one.

use std::fmt;

/// Errors from metric updates
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetricError {
    #[error("Score length mismatch: {less} less-toxic scores vs {more} more-toxic scores")]
    LengthMismatch { less: usize, more: usize },
}

/// Accumulating accuracy over ranked pairs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairwiseAccuracy {
    correct: u64,
    total: u64,
}

impl PairwiseAccuracy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a batch of scored pairs
    pub fn update(&mut self, less_toxic: &[f64], more_toxic: &[f64]) -> Result<(), MetricError> {
        if less_toxic.len() != more_toxic.len() {
            return Err(MetricError::LengthMismatch {
                less: less_toxic.len(),
                more: more_toxic.len(),
            });
        }

        self.correct += less_toxic
            .iter()
            .zip(more_toxic)
            .filter(|(less, more)| less < more)
            .count() as u64;
        self.total += less_toxic.len() as u64;
        Ok(())
    }

    /// Fraction of correctly ranked pairs, `None` before any update
    pub fn compute(&self) -> Option<f64> {
        (self.total > 0).then(|| self.correct as f64 / self.total as f64)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn correct(&self) -> u64 {
        self.correct
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Combine counts accumulated on another shard
    pub fn merge(&mut self, other: &PairwiseAccuracy) {
        self.correct += other.correct;
        self.total += other.total;
    }
}

impl fmt::Display for PairwiseAccuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.compute() {
            Some(acc) => write!(f, "{acc:.4} ({}/{})", self.correct, self.total),
            None => write!(f, "n/a (0/0)"),
        }
    }
}
