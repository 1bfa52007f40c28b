//! Tracking storage backends
//!
//! Provides the `TrackingBackend` trait, a JSON file-based implementation
//! for persisting runs to disk and an in-memory one for tests.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::Run;

/// Errors from tracking storage operations
#[derive(Debug, thiserror::Error)]
pub enum TrackingStorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Run not found: {0}")]
    RunNotFound(String),
}

/// Result alias for tracking storage operations
pub type Result<T> = std::result::Result<T, TrackingStorageError>;

/// Numeric suffix of a `run-N` ID
#[must_use]
pub fn run_number(run_id: &str) -> Option<u64> {
    run_id.strip_prefix("run-")?.parse().ok()
}

/// Orders `run-N` IDs numerically, other IDs after them by name
pub(crate) fn sort_runs(runs: &mut [Run]) {
    runs.sort_by(|a, b| {
        let key = |id: &str| (run_number(id).unwrap_or(u64::MAX), id.to_string());
        key(&a.run_id).cmp(&key(&b.run_id))
    });
}

/// Persistence for experiment runs
pub trait TrackingBackend {
    /// Save (or overwrite) a run
    fn save_run(&mut self, run: &Run) -> Result<()>;

    /// Load a run by its ID
    fn load_run(&self, run_id: &str) -> Result<Run>;

    /// List all stored runs, `run-N` IDs in numeric order
    fn list_runs(&self) -> Result<Vec<Run>>;

    /// IDs of all stored runs, without loading their contents
    fn run_ids(&self) -> Result<Vec<String>> {
        Ok(self.list_runs()?.into_iter().map(|r| r.run_id).collect())
    }

    /// Delete a run by its ID
    fn delete_run(&mut self, run_id: &str) -> Result<()>;
}

/// Stores each run as `{run_id}.json` in a directory
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    dir: PathBuf,
}

impl JsonFileBackend {
    /// Backend rooted at `dir`; the directory is created on first save
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn run_path(&self, run_id: &str) -> PathBuf {
        self.dir.join(format!("{run_id}.json"))
    }
}

impl TrackingBackend for JsonFileBackend {
    fn save_run(&mut self, run: &Run) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(run)?;
        fs::write(self.run_path(&run.run_id), json)?;
        Ok(())
    }

    fn load_run(&self, run_id: &str) -> Result<Run> {
        let path = self.run_path(run_id);
        if !path.exists() {
            return Err(TrackingStorageError::RunNotFound(run_id.to_string()));
        }
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    fn list_runs(&self) -> Result<Vec<Run>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut runs = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                let json = fs::read_to_string(&path)?;
                runs.push(serde_json::from_str::<Run>(&json)?);
            }
        }
        sort_runs(&mut runs);
        Ok(runs)
    }

    fn run_ids(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        Ok(ids)
    }

    fn delete_run(&mut self, run_id: &str) -> Result<()> {
        let path = self.run_path(run_id);
        if !path.exists() {
            return Err(TrackingStorageError::RunNotFound(run_id.to_string()));
        }
        fs::remove_file(path)?;
        Ok(())
    }
}

/// In-memory backend, no persistence
#[derive(Debug, Default, Clone)]
pub struct InMemoryBackend {
    runs: BTreeMap<String, Run>,
}

impl InMemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TrackingBackend for InMemoryBackend {
    fn save_run(&mut self, run: &Run) -> Result<()> {
        self.runs.insert(run.run_id.clone(), run.clone());
        Ok(())
    }

    fn load_run(&self, run_id: &str) -> Result<Run> {
        self.runs
            .get(run_id)
            .cloned()
            .ok_or_else(|| TrackingStorageError::RunNotFound(run_id.to_string()))
    }

    fn list_runs(&self) -> Result<Vec<Run>> {
        let mut runs: Vec<Run> = self.runs.values().cloned().collect();
        sort_runs(&mut runs);
        Ok(runs)
    }

    fn run_ids(&self) -> Result<Vec<String>> {
        Ok(self.runs.keys().cloned().collect())
    }

    fn delete_run(&mut self, run_id: &str) -> Result<()> {
        self.runs
            .remove(run_id)
            .map(|_| ())
            .ok_or_else(|| TrackingStorageError::RunNotFound(run_id.to_string()))
    }
}
