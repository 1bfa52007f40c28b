//! Experiment tracking for cross-validated runs
//!
//! Each fold of an experiment is recorded as its own [`Run`] carrying the
//! experiment's hyperparameters, the fold it held out and whatever metrics
//! the trainer reports. Runs persist through a pluggable
//! [`TrackingBackend`](storage::TrackingBackend).
//!
//! # Example
//!
//! ```
//! use toxicity_cv::tracking::{ExperimentTracker, RunStatus};
//! use toxicity_cv::tracking::storage::InMemoryBackend;
//!
//! # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let mut tracker = ExperimentTracker::new("ruddit-roberta", InMemoryBackend::new())?;
//! tracker.add_tag("dataset", "ruddit");
//!
//! let run_id = tracker.start_fold_run(2)?;
//! tracker.log_param(&run_id, "model/lr", "3e-5")?;
//! tracker.log_metric(&run_id, "val/loss", 0.31, 1)?;
//! tracker.end_run(&run_id, RunStatus::Completed)?;
//!
//! let run = tracker.get_run(&run_id)?;
//! assert_eq!(run.fold, Some(2));
//! # Ok(())
//! # }
//! ```

mod hparams;
pub mod storage;

#[cfg(test)]
mod tests;

pub use hparams::{hyperparameters, log_fold_split, HPARAM_SECTIONS};

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use storage::{TrackingBackend, TrackingStorageError};

/// Status of a tracking run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Active,
    Completed,
    Failed,
    Cancelled,
}

/// One recorded metric value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    pub value: f64,
    pub step: u64,
}

/// A single run of an experiment, usually one fold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub run_id: String,
    pub run_name: Option<String>,
    pub experiment_name: String,
    /// Held-out fold, when the run belongs to a cross-validation sweep
    #[serde(default)]
    pub fold: Option<usize>,
    pub status: RunStatus,
    pub params: BTreeMap<String, String>,
    pub metrics: BTreeMap<String, Vec<MetricPoint>>,
    pub artifacts: Vec<String>,
    pub tags: BTreeMap<String, String>,
    pub start_time_ms: Option<u64>,
    pub end_time_ms: Option<u64>,
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

impl Run {
    fn new(run_id: String, run_name: Option<String>, experiment_name: String) -> Self {
        Self {
            run_id,
            run_name,
            experiment_name,
            fold: None,
            status: RunStatus::Active,
            params: BTreeMap::new(),
            metrics: BTreeMap::new(),
            artifacts: Vec::new(),
            tags: BTreeMap::new(),
            start_time_ms: Some(now_ms()),
            end_time_ms: None,
        }
    }

    /// Most recent value of a metric
    #[must_use]
    pub fn last_metric(&self, key: &str) -> Option<f64> {
        self.metrics.get(key)?.last().map(|p| p.value)
    }
}

/// Errors from experiment tracking operations
#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Run is not active: {0}")]
    RunNotActive(String),

    #[error("Storage error: {0}")]
    Storage(#[from] TrackingStorageError),
}

/// Result alias for tracking operations
pub type Result<T> = std::result::Result<T, TrackingError>;

/// Experiment tracker
///
/// Active runs live in memory; ending a run persists it to the backend.
#[derive(Debug)]
pub struct ExperimentTracker<B: TrackingBackend> {
    experiment_name: String,
    tags: BTreeMap<String, String>,
    backend: B,
    active_runs: BTreeMap<String, Run>,
    next_run_id: u64,
}

impl<B: TrackingBackend> ExperimentTracker<B> {
    /// Create a tracker for `experiment_name`
    ///
    /// Run numbering continues after the runs already stored in `backend`.
    /// Fails when the backend cannot list its run IDs.
    pub fn new(experiment_name: impl Into<String>, backend: B) -> Result<Self> {
        let next_run_id = backend
            .run_ids()?
            .iter()
            .filter_map(|id| storage::run_number(id))
            .max()
            .map_or(1, |max| max + 1);

        Ok(Self {
            experiment_name: experiment_name.into(),
            tags: BTreeMap::new(),
            backend,
            active_runs: BTreeMap::new(),
            next_run_id,
        })
    }

    /// Add an experiment-level tag, inherited by runs started afterwards
    pub fn add_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn experiment_name(&self) -> &str {
        &self.experiment_name
    }

    #[must_use]
    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// Backend the tracker persists to
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Start a new run, returning its ID
    pub fn start_run(&mut self, run_name: Option<&str>) -> Result<String> {
        let run_id = format!("run-{}", self.next_run_id);
        self.next_run_id += 1;

        let mut run = Run::new(
            run_id.clone(),
            run_name.map(String::from),
            self.experiment_name.clone(),
        );
        run.tags.extend(self.tags.clone());

        tracing::debug!(run_id = %run_id, experiment = %self.experiment_name, "started run");
        self.active_runs.insert(run_id.clone(), run);
        Ok(run_id)
    }

    /// Start a run named after the fold it holds out
    pub fn start_fold_run(&mut self, fold: usize) -> Result<String> {
        let run_id = self.start_run(Some(&format!("fold-{fold}")))?;
        if let Some(run) = self.active_runs.get_mut(&run_id) {
            run.fold = Some(fold);
        }
        Ok(run_id)
    }

    /// End a run with the given status, persisting it
    pub fn end_run(&mut self, run_id: &str, status: RunStatus) -> Result<()> {
        let mut run = self
            .active_runs
            .remove(run_id)
            .ok_or_else(|| TrackingError::RunNotFound(run_id.to_string()))?;

        run.status = status;
        run.end_time_ms = Some(now_ms());

        self.backend.save_run(&run)?;
        tracing::debug!(run_id, status = ?status, "ended run");
        Ok(())
    }

    fn active_run(&mut self, run_id: &str) -> Result<&mut Run> {
        self.active_runs
            .get_mut(run_id)
            .ok_or_else(|| TrackingError::RunNotActive(run_id.to_string()))
    }

    /// Log a single parameter
    pub fn log_param(&mut self, run_id: &str, key: &str, value: &str) -> Result<()> {
        self.active_run(run_id)?
            .params
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Log several parameters at once
    pub fn log_params(&mut self, run_id: &str, params: &BTreeMap<String, String>) -> Result<()> {
        self.active_run(run_id)?.params.extend(params.clone());
        Ok(())
    }

    /// Log a metric value at a step
    pub fn log_metric(&mut self, run_id: &str, key: &str, value: f64, step: u64) -> Result<()> {
        self.active_run(run_id)?
            .metrics
            .entry(key.to_string())
            .or_default()
            .push(MetricPoint { value, step });
        Ok(())
    }

    /// Record an artifact path
    pub fn log_artifact(&mut self, run_id: &str, path: &str) -> Result<()> {
        self.active_run(run_id)?.artifacts.push(path.to_string());
        Ok(())
    }

    /// Fetch a run, active runs first
    pub fn get_run(&self, run_id: &str) -> Result<Run> {
        if let Some(run) = self.active_runs.get(run_id) {
            return Ok(run.clone());
        }
        self.backend
            .load_run(run_id)
            .map_err(|e| TrackingError::RunNotFound(format!("{run_id}: {e}")))
    }

    /// All runs, active and persisted, in run number order
    pub fn list_runs(&self) -> Result<Vec<Run>> {
        let mut runs: Vec<Run> = self.active_runs.values().cloned().collect();
        for run in self.backend.list_runs()? {
            if !self.active_runs.contains_key(&run.run_id) {
                runs.push(run);
            }
        }
        storage::sort_runs(&mut runs);
        Ok(runs)
    }

    /// Mean of the latest value of `metric` across completed fold runs
    ///
    /// This is the cross-validated score of the experiment.
    pub fn cv_score(&self, metric: &str) -> Result<Option<f64>> {
        let values: Vec<f64> = self
            .list_runs()?
            .iter()
            .filter(|r| r.status == RunStatus::Completed && r.fold.is_some())
            .filter(|r| r.experiment_name == self.experiment_name)
            .filter_map(|r| r.last_metric(metric))
            .collect();

        if values.is_empty() {
            return Ok(None);
        }
        Ok(Some(values.iter().sum::<f64>() / values.len() as f64))
    }
}
