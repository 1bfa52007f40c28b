//! Typed experiment configuration
//!
//! Deserialized from a resolved [`ConfigTree`]. Keys the pipeline does not
//! interpret itself (trainer flags, `_target_` entries, callback and logger
//! blocks) are preserved in `extra`/opaque mappings and passed through.

use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::error::{ConfigError, Result};
use super::tree::ConfigTree;
use crate::data::CsvOptions;
use crate::fold::{KFold, DEFAULT_SEED};

/// Deserialize a bool from either a YAML boolean (`true`) or a quoted string (`"true"`).
fn deserialize_bool_lenient<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        Str(String),
    }

    match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(b) => Ok(b),
        BoolOrString::Str(s) => match s.to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected 'true' or 'false', got '{other}'"
            ))),
        },
    }
}

fn default_true() -> bool {
    true
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_k_fold() -> usize {
    5
}

/// Complete experiment configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Experiment name (required in experiment mode)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Seed for fold shuffling and everything downstream
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of cross-validation folds
    #[serde(default = "default_k_fold")]
    pub k_fold: usize,

    /// Fold held out for validation in this run
    #[serde(default)]
    pub current_fold: usize,

    /// Require `name` to be set
    #[serde(default, deserialize_with = "deserialize_bool_lenient")]
    pub experiment_mode: bool,

    /// Silence warnings for the run
    #[serde(default, deserialize_with = "deserialize_bool_lenient")]
    pub ignore_warnings: bool,

    /// Evaluate on the held-out fold after training
    #[serde(default = "default_true", deserialize_with = "deserialize_bool_lenient")]
    pub test_after_training: bool,

    /// Dataset and loader settings
    pub datamodule: DataModuleConfig,

    /// Model, loss and optimizer settings
    #[serde(default)]
    pub model: ModelConfig,

    /// Trainer settings
    #[serde(default)]
    pub trainer: TrainerConfig,

    /// Callback definitions, passed through untouched
    #[serde(default, skip_serializing_if = "Mapping::is_empty")]
    pub callbacks: Mapping,

    /// Logger definitions, passed through untouched
    #[serde(default, skip_serializing_if = "Mapping::is_empty")]
    pub logger: Mapping,
}

/// Dataset configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataModuleConfig {
    /// CSV file that is split into folds
    pub train_path: PathBuf,

    /// Column holding the comment text
    #[serde(default = "default_text_column")]
    pub text_column: String,

    /// Target columns; empty means every other column
    #[serde(default)]
    pub target_columns: Vec<String>,

    /// Training batch size
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Validation batch size (defaults to `batch_size`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub val_batch_size: Option<usize>,

    /// Data loader worker processes
    #[serde(default)]
    pub num_workers: usize,

    /// Pin host memory for device transfer
    #[serde(default, deserialize_with = "deserialize_bool_lenient")]
    pub pin_memory: bool,

    /// Maximum tokenized length
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    /// Tokenizer identifier (defaults to the model's)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokenizer: Option<String>,

    /// Unrecognized keys
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn default_text_column() -> String {
    "text".to_string()
}

fn default_batch_size() -> usize {
    16
}

impl DataModuleConfig {
    /// CSV column mapping for the dataset loader
    #[must_use]
    pub fn csv_options(&self) -> CsvOptions {
        CsvOptions::default()
            .text_column(self.text_column.clone())
            .target_columns(self.target_columns.iter().cloned())
    }

    /// Effective validation batch size
    #[must_use]
    pub fn effective_val_batch_size(&self) -> usize {
        self.val_batch_size.unwrap_or(self.batch_size)
    }
}

/// Model configuration
///
/// `loss` and `scheduler` are identifiers for the external trainer
/// (`mse_loss`, `margin_loss`, `ReduceLROnPlateau`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Pretrained checkpoint identifier
    pub pretrained: String,

    /// Loss function identifier
    pub loss: String,

    /// LR scheduler identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduler: Option<String>,

    /// Base learning rate
    pub lr: f64,

    /// Weight decay for parameters that decay
    pub weight_decay: f64,

    /// Apply layer-wise learning-rate decay
    #[serde(deserialize_with = "deserialize_bool_lenient")]
    pub layerwise_lr_decay: bool,

    /// Per-layer multiplicative LR factor
    pub lr_decay_factor: f64,

    /// Zero the backbone's dropout probabilities
    #[serde(deserialize_with = "deserialize_bool_lenient")]
    pub remove_dropout: bool,

    /// Freeze backbone parameters
    #[serde(deserialize_with = "deserialize_bool_lenient")]
    pub freeze_backbone: bool,

    /// Unrecognized keys
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            pretrained: "roberta-base".to_string(),
            loss: "mse_loss".to_string(),
            scheduler: None,
            lr: 3e-5,
            weight_decay: 0.01,
            layerwise_lr_decay: false,
            lr_decay_factor: 0.7,
            remove_dropout: false,
            freeze_backbone: false,
            extra: BTreeMap::new(),
        }
    }
}

/// Trainer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub max_epochs: usize,
    pub gpus: usize,
    #[serde(deserialize_with = "deserialize_bool_lenient")]
    pub fast_dev_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    /// Unrecognized keys
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            max_epochs: 3,
            gpus: 0,
            fast_dev_run: false,
            precision: None,
            extra: BTreeMap::new(),
        }
    }
}

impl ExperimentConfig {
    /// Resolve interpolations in `tree` and deserialize
    pub fn from_tree(tree: &ConfigTree) -> Result<Self> {
        let resolved = tree.resolve()?;
        serde_yaml::from_value(resolved.into_value())
            .map_err(|e| ConfigError::Deserialize(e.to_string()))
    }

    /// Compose config files, apply overrides, resolve and deserialize
    ///
    /// Returns the composed (unresolved) tree alongside the typed config.
    pub fn load<I, P, O, S>(paths: I, overrides: O) -> Result<(ConfigTree, Self)>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<std::path::Path>,
        O: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = ConfigTree::compose(paths)?;
        tree.apply_overrides(overrides)?;
        let config = Self::from_tree(&tree)?;
        Ok((tree, config))
    }

    /// Fold splitter configured by `k_fold` and `seed`
    #[must_use]
    pub fn kfold(&self) -> KFold {
        KFold::new(self.k_fold).with_seed(self.seed)
    }
}
