//! Dataset paired with its cached fold assignment

use super::{FoldAssignment, FoldError, FoldSplit, KFold};
use crate::data::Dataset;

/// A loaded dataset together with the fold assignment computed for it
///
/// The assignment is computed once at construction and never changes, so
/// repeated [`split`](Self::split) calls for different folds stay
/// consistent with each other.
#[derive(Debug, Clone)]
pub struct FoldedDataset<'a> {
    dataset: &'a Dataset,
    assignment: FoldAssignment,
}

impl<'a> FoldedDataset<'a> {
    /// Partition `dataset` with the given splitter
    pub fn new(dataset: &'a Dataset, kfold: &KFold) -> Result<Self, FoldError> {
        let assignment = kfold.assign(dataset.len())?;
        Ok(Self {
            dataset,
            assignment,
        })
    }

    /// Underlying dataset
    #[must_use]
    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    /// Cached fold assignment
    #[must_use]
    pub fn assignment(&self) -> &FoldAssignment {
        &self.assignment
    }

    /// Number of folds
    #[must_use]
    pub fn k(&self) -> usize {
        self.assignment.k()
    }

    /// Train/validation split holding out `fold`
    pub fn split(&self, fold: usize) -> Result<FoldSplit, FoldError> {
        self.assignment.split(fold)
    }
}
