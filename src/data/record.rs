//! Record, dataset and view types

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// A target cell: numeric score/label or a categorical value
///
/// Pairwise datasets carry the competing comment (e.g. `more_toxic`) as a
/// categorical target next to the primary text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Target {
    Numeric(f64),
    Categorical(String),
}

impl Target {
    /// Parse a raw cell, preferring a numeric reading
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Self::Numeric(value),
            _ => Self::Categorical(raw.to_string()),
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Numeric(value) => Some(*value),
            Self::Categorical(_) => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Numeric(_) => None,
            Self::Categorical(value) => Some(value),
        }
    }
}

/// One dataset row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// Primary text field
    pub text: String,
    /// Named target fields
    pub targets: BTreeMap<String, Target>,
}

impl Record {
    /// Create a record with no targets
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            targets: BTreeMap::new(),
        }
    }

    /// Add a target field
    pub fn with_target(mut self, name: impl Into<String>, target: Target) -> Self {
        self.targets.insert(name.into(), target);
        self
    }

    /// Add a numeric target field
    pub fn with_numeric(self, name: impl Into<String>, value: f64) -> Self {
        self.with_target(name, Target::Numeric(value))
    }

    /// Look up a target by column name
    #[must_use]
    pub fn target(&self, name: &str) -> Option<&Target> {
        self.targets.get(name)
    }
}

/// Ordered, immutable collection of records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
    source: Option<PathBuf>,
}

impl Dataset {
    /// Build an in-memory dataset
    pub fn from_records(records: Vec<Record>) -> Self {
        Self {
            records,
            source: None,
        }
    }

    pub(crate) fn with_source(mut self, source: PathBuf) -> Self {
        self.source = Some(source);
        self
    }

    /// Number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at `index`
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// File the dataset was loaded from, if any
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

/// Subset of a dataset selected by record indices
///
/// Holds no records of its own; positions in the view map through
/// `indices` into the parent dataset.
#[derive(Debug, Clone, Copy)]
pub struct DatasetView<'a> {
    dataset: &'a Dataset,
    indices: &'a [usize],
}

impl<'a> DatasetView<'a> {
    pub fn new(dataset: &'a Dataset, indices: &'a [usize]) -> Self {
        Self { dataset, indices }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Indices into the parent dataset
    #[must_use]
    pub fn indices(&self) -> &'a [usize] {
        self.indices
    }

    /// Record at view position `pos`
    #[must_use]
    pub fn get(&self, pos: usize) -> Option<&'a Record> {
        self.indices.get(pos).and_then(|&i| self.dataset.get(i))
    }

    /// Records in view order; indices past the end of the dataset are skipped
    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + 'a {
        let dataset = self.dataset;
        self.indices.iter().filter_map(move |&i| dataset.get(i))
    }

    /// Numeric values of `column` for every record in the view
    ///
    /// Records whose target is missing or categorical are skipped.
    pub fn numeric_column(&self, column: &str) -> Vec<f64> {
        self.iter()
            .filter_map(|r| r.target(column).and_then(Target::as_f64))
            .collect()
    }
}
