//! Property-based tests for fold invariants

use super::*;
use proptest::prelude::*;

/// (n, k, seed) with 2 <= k <= n
fn valid_inputs() -> impl Strategy<Value = (usize, usize, u64)> {
    (2usize..400).prop_flat_map(|n| (Just(n), 2usize..=n.min(20), any::<u64>()))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_every_record_assigned_once((n, k, seed) in valid_inputs()) {
        let assignment = assign(n, k, seed).unwrap();
        prop_assert_eq!(assignment.len(), n);
        prop_assert!(assignment.as_slice().iter().all(|&f| f < k));
    }

    #[test]
    fn prop_fold_sizes_balanced((n, k, seed) in valid_inputs()) {
        let sizes = assign(n, k, seed).unwrap().fold_sizes();
        prop_assert_eq!(sizes.len(), k);
        prop_assert_eq!(sizes.iter().sum::<usize>(), n);

        let floor = n / k;
        let ceil = n.div_ceil(k);
        prop_assert!(sizes.iter().all(|&s| s == floor || s == ceil));
        prop_assert_eq!(sizes.iter().filter(|&&s| s == ceil && ceil != floor).count(), n % k);
    }

    #[test]
    fn prop_assignment_deterministic((n, k, seed) in valid_inputs()) {
        prop_assert_eq!(assign(n, k, seed).unwrap(), assign(n, k, seed).unwrap());
    }

    #[test]
    fn prop_split_disjoint_and_complete(
        (n, k, seed) in valid_inputs(),
        fold_seed in any::<usize>(),
    ) {
        let assignment = assign(n, k, seed).unwrap();
        let s = split(&assignment, fold_seed % k).unwrap();

        let mut seen = vec![0u8; n];
        for &i in s.train_indices.iter().chain(&s.val_indices) {
            seen[i] += 1;
        }
        prop_assert!(seen.iter().all(|&c| c == 1));
    }

    #[test]
    fn prop_val_sets_partition_records((n, k, seed) in valid_inputs()) {
        let assignment = assign(n, k, seed).unwrap();
        let mut counts = vec![0usize; n];
        for s in assignment.splits() {
            for &i in &s.val_indices {
                counts[i] += 1;
            }
        }
        prop_assert!(counts.iter().all(|&c| c == 1));
    }

    #[test]
    fn prop_out_of_range_fold_rejected((n, k, seed) in valid_inputs(), extra in 0usize..50) {
        let assignment = assign(n, k, seed).unwrap();
        let is_out_of_range = matches!(
            split(&assignment, k + extra),
            Err(FoldError::FoldIndexOutOfRange { .. })
        );
        prop_assert!(is_out_of_range);
    }

    #[test]
    fn prop_too_many_folds_rejected(n in 0usize..50, extra in 1usize..20, seed in any::<u64>()) {
        let is_invalid = matches!(
            assign(n, n + extra, seed),
            Err(FoldError::InvalidFoldCount { .. })
        );
        prop_assert!(is_invalid);
    }
}
