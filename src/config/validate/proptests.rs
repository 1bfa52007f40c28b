//! Property-based tests for configuration validation

use super::tests::valid_config;
use super::*;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_any_fold_below_k_is_valid(k_fold in 2usize..20, fold_seed in any::<usize>()) {
        let mut cfg = valid_config();
        cfg.k_fold = k_fold;
        cfg.current_fold = fold_seed % k_fold;
        prop_assert!(validate_config(&cfg).is_ok());
    }

    #[test]
    fn prop_fold_at_or_above_k_fails(k_fold in 2usize..20, extra in 0usize..100) {
        let mut cfg = valid_config();
        cfg.k_fold = k_fold;
        cfg.current_fold = k_fold + extra;
        prop_assert_eq!(
            validate_config(&cfg),
            Err(ValidationError::FoldOutOfRange { fold: k_fold + extra, k_fold })
        );
    }

    #[test]
    fn prop_valid_hyperparameters_pass(
        batch_size in 1usize..512,
        lr in 1e-7f64..=1.0,
        weight_decay in 0.0f64..1.0,
        epochs in 1usize..50,
    ) {
        let mut cfg = valid_config();
        cfg.datamodule.batch_size = batch_size;
        cfg.model.lr = lr;
        cfg.model.weight_decay = weight_decay;
        cfg.trainer.max_epochs = epochs;
        prop_assert!(validate_config(&cfg).is_ok());
    }

    #[test]
    fn prop_lr_above_one_fails(lr in 1.0001f64..100.0) {
        let mut cfg = valid_config();
        cfg.model.lr = lr;
        let rejected = matches!(
            validate_config(&cfg),
            Err(ValidationError::InvalidLearningRate(_))
        );
        prop_assert!(rejected);
    }
}
