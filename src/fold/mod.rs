//! K-fold partitioning for cross-validated fine-tuning runs
//!
//! A run selects one fold as its validation set through the `current_fold`
//! experiment value. Everything here is a pure function of
//! `(n_records, k_fold, seed)`, so separate runs (one per fold, possibly on
//! different machines) agree on which records belong to which fold.
//!
//! # Example
//!
//! ```
//! use toxicity_cv::fold::{assign, split};
//!
//! let assignment = assign(10, 5, 42)?;
//! assert_eq!(assignment.fold_sizes(), vec![2, 2, 2, 2, 2]);
//!
//! let fold0 = split(&assignment, 0)?;
//! assert_eq!(fold0.val_indices.len(), 2);
//! assert_eq!(fold0.train_indices.len(), 8);
//! # Ok::<(), toxicity_cv::fold::FoldError>(())
//! ```

mod assignment;
mod folded;
mod kfold;

#[cfg(test)]
mod proptests;

pub use assignment::{FoldAssignment, FoldSplit};
pub use folded::FoldedDataset;
pub use kfold::{assign, split, KFold, DEFAULT_SEED};

/// Errors raised while partitioning records into folds
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FoldError {
    #[error("Invalid fold count: k_fold={k} for {n} records (need 2 <= k_fold <= records)")]
    InvalidFoldCount { k: usize, n: usize },

    #[error("Fold index out of range: current_fold={fold} (must be in 0..{k})")]
    FoldIndexOutOfRange { fold: usize, k: usize },
}
