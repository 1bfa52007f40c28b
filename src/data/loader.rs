//! CSV dataset loader

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use super::{Dataset, Record, Target};

/// Errors raised while loading a dataset
#[derive(Debug, thiserror::Error)]
pub enum DatasetLoadError {
    #[error("Failed to open dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Column '{column}' not found (available: {})", .available.join(", "))]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    #[error("Dataset {source_name} contains no records")]
    Empty { source_name: String },
}

/// How CSV columns map onto records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    /// Column holding the primary text
    pub text_column: String,
    /// Target columns; empty means every column except the text column
    pub target_columns: Vec<String>,
    /// Field delimiter
    pub delimiter: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            text_column: "text".to_string(),
            target_columns: Vec::new(),
            delimiter: b',',
        }
    }
}

impl CsvOptions {
    pub fn text_column(mut self, column: impl Into<String>) -> Self {
        self.text_column = column.into();
        self
    }

    pub fn target_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

/// Load a CSV dataset with a header row
pub fn load(path: impl AsRef<Path>, options: &CsvOptions) -> Result<Dataset, DatasetLoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| DatasetLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let dataset = read_records(file, options, &path.display().to_string())?;
    tracing::info!(
        path = %path.display(),
        records = dataset.len(),
        "loaded dataset"
    );
    Ok(dataset.with_source(path.to_path_buf()))
}

/// Parse CSV from any reader
pub fn from_reader<R: Read>(reader: R, options: &CsvOptions) -> Result<Dataset, DatasetLoadError> {
    read_records(reader, options, "<reader>")
}

fn column_index(headers: &csv::StringRecord, column: &str) -> Result<usize, DatasetLoadError> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| DatasetLoadError::MissingColumn {
            column: column.to_string(),
            available: headers.iter().map(String::from).collect(),
        })
}

fn read_records<R: Read>(
    reader: R,
    options: &CsvOptions,
    source_name: &str,
) -> Result<Dataset, DatasetLoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let text_index = column_index(&headers, &options.text_column)?;

    let target_columns: Vec<(String, usize)> = if options.target_columns.is_empty() {
        headers
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != text_index)
            .map(|(i, h)| (h.to_string(), i))
            .collect()
    } else {
        options
            .target_columns
            .iter()
            .map(|c| column_index(&headers, c).map(|i| (c.clone(), i)))
            .collect::<Result<_, _>>()?
    };

    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row?;
        let mut record = Record::new(row.get(text_index).unwrap_or_default());
        for (name, index) in &target_columns {
            let raw = row.get(*index).unwrap_or_default();
            record.targets.insert(name.clone(), Target::parse(raw));
        }
        records.push(record);
    }

    if records.is_empty() {
        return Err(DatasetLoadError::Empty {
            source_name: source_name.to_string(),
        });
    }

    tracing::debug!(
        records = records.len(),
        targets = target_columns.len(),
        "parsed csv"
    );
    Ok(Dataset::from_records(records))
}
