//! Configuration validation logic

use super::error::ValidationError;
use crate::config::schema::ExperimentConfig;

/// Validate an experiment configuration
///
/// Checks value ranges and the fold selection. Dataset existence is left
/// to the loader, which reports the path it failed to open.
pub fn validate_config(config: &ExperimentConfig) -> Result<(), ValidationError> {
    // Fold selection
    if config.k_fold < 2 {
        return Err(ValidationError::InvalidFoldCount(config.k_fold));
    }
    if config.current_fold >= config.k_fold {
        return Err(ValidationError::FoldOutOfRange {
            fold: config.current_fold,
            k_fold: config.k_fold,
        });
    }

    // Data
    let data = &config.datamodule;
    if data.train_path.as_os_str().is_empty() {
        return Err(ValidationError::MissingTrainPath);
    }
    if data.text_column.trim().is_empty() {
        return Err(ValidationError::EmptyTextColumn);
    }
    if data.batch_size == 0 {
        return Err(ValidationError::InvalidBatchSize(data.batch_size));
    }
    if let Some(0) = data.val_batch_size {
        return Err(ValidationError::InvalidValBatchSize(0));
    }
    if let Some(0) = data.max_length {
        return Err(ValidationError::InvalidMaxLength(0));
    }

    // Model
    let model = &config.model;
    if model.pretrained.trim().is_empty() {
        return Err(ValidationError::EmptyIdentifier("model.pretrained"));
    }
    if model.loss.trim().is_empty() {
        return Err(ValidationError::EmptyIdentifier("model.loss"));
    }
    if !in_unit_interval(model.lr) {
        return Err(ValidationError::InvalidLearningRate(model.lr));
    }
    if model.weight_decay.is_nan() || model.weight_decay < 0.0 {
        return Err(ValidationError::InvalidWeightDecay(model.weight_decay));
    }
    if model.layerwise_lr_decay && !in_unit_interval(model.lr_decay_factor) {
        return Err(ValidationError::InvalidDecayFactor(model.lr_decay_factor));
    }

    // Trainer
    if config.trainer.max_epochs == 0 {
        return Err(ValidationError::InvalidEpochs(0));
    }
    if let Some(precision) = config.trainer.precision {
        if ![16, 32, 64].contains(&precision) {
            return Err(ValidationError::InvalidPrecision(precision));
        }
    }

    Ok(())
}

/// True for `0 < x <= 1`, false for NaN
fn in_unit_interval(x: f64) -> bool {
    x > 0.0 && x <= 1.0
}
