//! Seeded K-Fold splitter

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::{FoldAssignment, FoldError, FoldSplit};

/// Seed used when none is configured
pub const DEFAULT_SEED: u64 = 42;

/// K-Fold cross-validation splitter
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KFold {
    n_splits: usize,
    shuffle: bool,
    seed: u64,
}

impl KFold {
    /// Create a new KFold splitter with `n_splits` folds
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits,
            shuffle: true,
            seed: DEFAULT_SEED,
        }
    }

    /// Set random seed for shuffling
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Disable shuffling (folds become contiguous runs of the input order)
    pub fn without_shuffle(mut self) -> Self {
        self.shuffle = false;
        self
    }

    /// Number of folds
    #[must_use]
    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Seed used for the permutation
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Whether record order is shuffled before chunking
    #[must_use]
    pub fn is_shuffled(&self) -> bool {
        self.shuffle
    }

    /// Assign each of `n_samples` records to a fold
    ///
    /// The record order is permuted with a PRNG seeded by `seed`, then cut
    /// into `n_splits` contiguous chunks. The first `n_samples % n_splits`
    /// chunks hold one extra record, so fold sizes differ by at most one.
    pub fn assign(&self, n_samples: usize) -> Result<FoldAssignment, FoldError> {
        let k = self.n_splits;
        if k < 2 || k > n_samples {
            return Err(FoldError::InvalidFoldCount { k, n: n_samples });
        }

        let mut order: Vec<usize> = (0..n_samples).collect();
        if self.shuffle {
            let mut rng = StdRng::seed_from_u64(self.seed);
            order.shuffle(&mut rng);
        }

        let fold_size = n_samples / k;
        let remainder = n_samples % k;

        let mut folds = vec![0usize; n_samples];
        let mut start = 0;
        for fold in 0..k {
            let end = start + fold_size + usize::from(fold < remainder);
            for &index in &order[start..end] {
                folds[index] = fold;
            }
            start = end;
        }

        tracing::debug!(
            n_samples,
            k_fold = k,
            seed = self.seed,
            shuffle = self.shuffle,
            "assigned records to folds"
        );

        let seed = self.shuffle.then_some(self.seed);
        Ok(FoldAssignment::from_parts(folds, k, seed))
    }

    /// Generate the train/validation split for every fold, in fold order
    pub fn splits(&self, n_samples: usize) -> Result<Vec<FoldSplit>, FoldError> {
        Ok(self.assign(n_samples)?.splits().collect())
    }
}

/// Assign `n` records to `k` folds using a permutation seeded by `seed`
pub fn assign(n: usize, k: usize, seed: u64) -> Result<FoldAssignment, FoldError> {
    KFold::new(k).with_seed(seed).assign(n)
}

/// Derive the train/validation split that holds out `fold`
pub fn split(assignment: &FoldAssignment, fold: usize) -> Result<FoldSplit, FoldError> {
    assignment.split(fold)
}
