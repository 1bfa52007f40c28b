//! Evaluation metrics for pairwise toxicity ranking

mod pairwise;

pub use pairwise::{MetricError, PairwiseAccuracy};
