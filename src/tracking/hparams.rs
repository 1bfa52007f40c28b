//! Hyperparameter extraction and fold-split logging

use std::collections::BTreeMap;

use serde_yaml::Value;

use super::storage::TrackingBackend;
use super::{ExperimentTracker, Result};
use crate::config::{ConfigError, ConfigTree};
use crate::fold::FoldSplit;

/// Config sections always saved as hyperparameters
pub const HPARAM_SECTIONS: &[&str] = &["trainer", "model", "datamodule"];

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => serde_yaml::to_string(value)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

fn flatten(prefix: &str, value: &Value, out: &mut BTreeMap<String, String>) {
    match value {
        Value::Mapping(map) if !map.is_empty() => {
            for (k, v) in map {
                let key = match k {
                    Value::String(s) => s.clone(),
                    other => scalar_text(other),
                };
                flatten(&format!("{prefix}/{key}"), v, out);
            }
        }
        other => {
            out.insert(prefix.to_string(), scalar_text(other));
        }
    }
}

/// Flatten the hyperparameter sections of a config into `section/key` pairs
///
/// Saves `trainer`, `model` and `datamodule`, plus `seed` and `callbacks`
/// when present. Interpolations are resolved first.
pub fn hyperparameters(
    tree: &ConfigTree,
) -> std::result::Result<BTreeMap<String, String>, ConfigError> {
    let resolved = tree.resolve()?;
    let mut out = BTreeMap::new();

    for section in HPARAM_SECTIONS.iter().chain(&["seed", "callbacks"]) {
        let value = resolved.get(section);
        match value {
            Some(value) => flatten(section, value, &mut out),
            None if HPARAM_SECTIONS.contains(section) => {
                out.insert((*section).to_string(), "null".to_string());
            }
            None => {}
        }
    }
    Ok(out)
}

/// Record the sizes of a fold split on a run
pub fn log_fold_split<B: TrackingBackend>(
    tracker: &mut ExperimentTracker<B>,
    run_id: &str,
    split: &FoldSplit,
    k_fold: usize,
) -> Result<()> {
    tracker.log_param(run_id, "fold/current_fold", &split.fold.to_string())?;
    tracker.log_param(run_id, "fold/k_fold", &k_fold.to_string())?;
    tracker.log_metric(run_id, "fold/train_size", split.train_indices.len() as f64, 0)?;
    tracker.log_metric(run_id, "fold/val_size", split.val_indices.len() as f64, 0)?;
    Ok(())
}
