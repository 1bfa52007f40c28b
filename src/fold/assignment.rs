//! Fold assignment and the per-fold train/validation view

use serde::Serialize;

use super::FoldError;
use crate::data::{Dataset, DatasetView};

/// Mapping from record index to fold id in `0..k`
///
/// Only constructed by [`KFold::assign`](super::KFold::assign), which
/// guarantees every record has exactly one fold and fold sizes are balanced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoldAssignment {
    k_fold: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    folds: Vec<usize>,
}

impl FoldAssignment {
    pub(crate) fn from_parts(folds: Vec<usize>, k_fold: usize, seed: Option<u64>) -> Self {
        Self { k_fold, seed, folds }
    }

    /// Number of records covered
    #[must_use]
    pub fn len(&self) -> usize {
        self.folds.len()
    }

    /// Whether no records are covered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.folds.is_empty()
    }

    /// Number of folds
    #[must_use]
    pub fn k(&self) -> usize {
        self.k_fold
    }

    /// Shuffle seed, `None` when the records were chunked in input order
    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Fold id of record `index`
    #[must_use]
    pub fn fold_of(&self, index: usize) -> Option<usize> {
        self.folds.get(index).copied()
    }

    /// Fold ids indexed by record
    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.folds
    }

    /// Number of records in each fold, indexed by fold id
    #[must_use]
    pub fn fold_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.k_fold];
        for &fold in &self.folds {
            sizes[fold] += 1;
        }
        sizes
    }

    fn check_fold(&self, fold: usize) -> Result<(), FoldError> {
        if fold >= self.k_fold {
            return Err(FoldError::FoldIndexOutOfRange {
                fold,
                k: self.k_fold,
            });
        }
        Ok(())
    }

    /// Record indices held out by `fold`, ascending
    pub fn val_indices(&self, fold: usize) -> Result<Vec<usize>, FoldError> {
        self.check_fold(fold)?;
        Ok(self
            .folds
            .iter()
            .enumerate()
            .filter(|&(_, &f)| f == fold)
            .map(|(index, _)| index)
            .collect())
    }

    /// Split records into train (every other fold) and validation (`fold`)
    pub fn split(&self, fold: usize) -> Result<FoldSplit, FoldError> {
        self.check_fold(fold)?;

        let mut train_indices = Vec::with_capacity(self.folds.len());
        let mut val_indices = Vec::new();
        for (index, &f) in self.folds.iter().enumerate() {
            if f == fold {
                val_indices.push(index);
            } else {
                train_indices.push(index);
            }
        }

        Ok(FoldSplit {
            fold,
            train_indices,
            val_indices,
        })
    }

    /// Every fold's split, in fold order
    pub fn splits(&self) -> impl Iterator<Item = FoldSplit> + '_ {
        (0..self.k_fold).filter_map(|fold| self.split(fold).ok())
    }
}

/// Train/validation partition of record indices for one held-out fold
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoldSplit {
    /// Held-out fold id
    pub fold: usize,
    /// Records whose fold differs from `fold`, ascending
    pub train_indices: Vec<usize>,
    /// Records in `fold`, ascending
    pub val_indices: Vec<usize>,
}

impl FoldSplit {
    /// Total number of records covered by this split
    #[must_use]
    pub fn len(&self) -> usize {
        self.train_indices.len() + self.val_indices.len()
    }

    /// Whether the split covers no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrowed view of the training records
    pub fn train_view<'a>(&'a self, dataset: &'a Dataset) -> DatasetView<'a> {
        DatasetView::new(dataset, &self.train_indices)
    }

    /// Borrowed view of the validation records
    pub fn val_view<'a>(&'a self, dataset: &'a Dataset) -> DatasetView<'a> {
        DatasetView::new(dataset, &self.val_indices)
    }
}
