//! Run command implementation
//!
//! Prepares a cross-validated run: composes and validates the config,
//! partitions the dataset, writes the fold layout next to the rendered
//! config and records one tracked run per prepared fold.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::compose::write_config_tree_log;
use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{
    apply_extras, render_config_tree, validate_config, ExperimentConfig, ModelConfig, RunArgs,
    DEFAULT_FIELDS,
};
use crate::data;
use crate::error::{Error, Result};
use crate::fold::{FoldAssignment, FoldSplit, FoldedDataset};
use crate::optim::{encoder_layer_prefixes, LayerwiseDecay};
use crate::tracking::storage::JsonFileBackend;
use crate::tracking::{hyperparameters, log_fold_split, ExperimentTracker, RunStatus};

/// File the fold layout is written to
pub const FOLDS_FILE: &str = "folds.json";

/// Experiment name used when the config has none
const DEFAULT_EXPERIMENT: &str = "default";

/// Encoder depth assumed when `model.num_hidden_layers` is absent
const DEFAULT_ENCODER_LAYERS: usize = 12;

/// Contents of `folds.json`
#[derive(Debug, Serialize)]
struct FoldsFile<'a> {
    experiment: &'a str,
    dataset: &'a Path,
    assignment: &'a FoldAssignment,
    splits: &'a [FoldSplit],
}

/// What a prepared run produced
#[derive(Debug)]
pub struct RunSummary {
    pub experiment: String,
    pub records: usize,
    pub splits: Vec<FoldSplit>,
    pub run_ids: Vec<String>,
    pub folds_path: Option<PathBuf>,
}

/// Learning rate per encoder layer, keyed `optim/lr/<layer>`
///
/// A missing or unusable `model.num_hidden_layers` falls back to
/// [`DEFAULT_ENCODER_LAYERS`].
fn layer_learning_rates(model: &ModelConfig) -> BTreeMap<String, String> {
    let decay = LayerwiseDecay::from_model(model);
    if !decay.enabled {
        return BTreeMap::new();
    }

    let depth = model
        .extra
        .get("num_hidden_layers")
        .and_then(serde_yaml::Value::as_u64)
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(DEFAULT_ENCODER_LAYERS);

    // top layer first, one factor per step down
    let mut lr = decay.lr;
    encoder_layer_prefixes(depth)
        .iter()
        .rev()
        .map(|layer| {
            lr *= decay.factor;
            (format!("optim/lr/{layer}"), lr.to_string())
        })
        .collect()
}

/// Prepare the folds named by `args`, writing outputs unless `dry_run`
pub fn prepare_run(args: &RunArgs) -> Result<RunSummary> {
    let (tree, mut config) = ExperimentConfig::load(&args.configs, &args.overrides)?;
    let extras = apply_extras(&mut config)?;
    validate_config(&config)?;

    let dataset = data::load(&config.datamodule.train_path, &config.datamodule.csv_options())?;
    let folded = FoldedDataset::new(&dataset, &config.kfold())?;

    let folds: Vec<usize> = if args.all_folds {
        (0..folded.k()).collect()
    } else {
        vec![config.current_fold]
    };
    let splits = folds
        .iter()
        .map(|&fold| folded.split(fold))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let experiment = config
        .name
        .clone()
        .unwrap_or_else(|| DEFAULT_EXPERIMENT.to_string());
    let mut summary = RunSummary {
        experiment,
        records: dataset.len(),
        splits,
        run_ids: Vec::new(),
        folds_path: None,
    };

    if args.dry_run {
        tracing::info!(folds = summary.splits.len(), "dry run, nothing written");
        return Ok(summary);
    }

    fs::create_dir_all(&args.output_dir)
        .map_err(|e| Error::io(format!("creating {}", args.output_dir.display()), e))?;

    let folds_path = args.output_dir.join(FOLDS_FILE);
    let contents = FoldsFile {
        experiment: &summary.experiment,
        dataset: &config.datamodule.train_path,
        assignment: folded.assignment(),
        splits: &summary.splits,
    };
    fs::write(&folds_path, serde_json::to_string_pretty(&contents)?)
        .map_err(|e| Error::io(format!("writing {}", folds_path.display()), e))?;

    let rendered = render_config_tree(&tree, DEFAULT_FIELDS, true)?;
    write_config_tree_log(&args.output_dir, &rendered)
        .map_err(|e| Error::io("writing config tree log", e))?;

    let mut params = hyperparameters(&tree)?;
    params.extend(layer_learning_rates(&config.model));

    let mut tracker = ExperimentTracker::new(
        summary.experiment.clone(),
        JsonFileBackend::new(args.output_dir.join("runs")),
    )?;
    tracker.add_tag("k_fold", config.k_fold.to_string());
    tracker.add_tag("seed", config.seed.to_string());
    if extras.debug_forced {
        tracker.add_tag("fast_dev_run", "true");
    }

    let artifact = folds_path.display().to_string();
    for split in &summary.splits {
        let run_id = tracker.start_fold_run(split.fold)?;
        tracker.log_params(&run_id, &params)?;
        log_fold_split(&mut tracker, &run_id, split, config.k_fold)?;
        tracker.log_artifact(&run_id, &artifact)?;
        tracker.end_run(&run_id, RunStatus::Completed)?;
        summary.run_ids.push(run_id);
    }

    tracing::info!(
        experiment = %summary.experiment,
        runs = summary.run_ids.len(),
        "prepared cross-validation runs"
    );
    summary.folds_path = Some(folds_path);
    Ok(summary)
}

pub fn run_run(args: RunArgs, level: LogLevel) -> std::result::Result<(), String> {
    let summary = prepare_run(&args).map_err(|e| e.to_string())?;

    log(
        level,
        LogLevel::Normal,
        &format!(
            "Experiment '{}': {} records",
            summary.experiment, summary.records
        ),
    );
    for split in &summary.splits {
        log(
            level,
            LogLevel::Normal,
            &format!(
                "  fold {}: train={} val={}",
                split.fold,
                split.train_indices.len(),
                split.val_indices.len()
            ),
        );
    }
    if let Some(path) = &summary.folds_path {
        log(
            level,
            LogLevel::Verbose,
            &format!("Wrote {} ({} runs tracked)", path.display(), summary.run_ids.len()),
        );
    }

    Ok(())
}
