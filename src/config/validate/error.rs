//! Validation error types

/// Validation error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid k_fold: {0} (must be >= 2)")]
    InvalidFoldCount(usize),

    #[error("Invalid current_fold: {fold} (must be in 0..{k_fold})")]
    FoldOutOfRange { fold: usize, k_fold: usize },

    #[error("Training data path is empty")]
    MissingTrainPath,

    #[error("Text column name is empty")]
    EmptyTextColumn,

    #[error("Invalid batch size: {0} (must be > 0)")]
    InvalidBatchSize(usize),

    #[error("Invalid validation batch size: {0} (must be > 0)")]
    InvalidValBatchSize(usize),

    #[error("Invalid max_length: {0} (must be > 0)")]
    InvalidMaxLength(usize),

    #[error("Invalid learning rate: {0} (must be > 0.0 and <= 1.0)")]
    InvalidLearningRate(f64),

    #[error("Invalid weight decay: {0} (must be >= 0.0)")]
    InvalidWeightDecay(f64),

    #[error("Invalid lr_decay_factor: {0} (must be > 0.0 and <= 1.0)")]
    InvalidDecayFactor(f64),

    #[error("Invalid max_epochs: {0} (must be > 0)")]
    InvalidEpochs(usize),

    #[error("Invalid precision: {0} (must be one of: 16, 32, 64)")]
    InvalidPrecision(u32),

    #[error("Empty {0} identifier")]
    EmptyIdentifier(&'static str),
}
