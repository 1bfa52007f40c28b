//! Folds command implementation

use serde::Serialize;

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{FoldsArgs, OutputFormat};
use crate::data::{self, CsvOptions};
use crate::fold::{assign, FoldAssignment, FoldSplit};

/// Fold layout of a dataset, optionally with one split
#[derive(Debug, Serialize)]
pub struct FoldsReport {
    pub records: usize,
    pub k_fold: usize,
    pub seed: Option<u64>,
    pub fold_sizes: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split: Option<FoldSplit>,
}

impl FoldsReport {
    pub fn new(assignment: &FoldAssignment, fold: Option<usize>) -> Result<Self, String> {
        let split = fold
            .map(|f| assignment.split(f))
            .transpose()
            .map_err(|e| e.to_string())?;
        Ok(Self {
            records: assignment.len(),
            k_fold: assignment.k(),
            seed: assignment.seed(),
            fold_sizes: assignment.fold_sizes(),
            split,
        })
    }
}

/// Format the report as human-readable text
pub fn format_report(report: &FoldsReport) -> String {
    let seed = report
        .seed
        .map_or_else(|| "none".to_string(), |s| s.to_string());
    let mut lines = vec![format!(
        "{} records in {} folds (seed {seed})",
        report.records, report.k_fold
    )];
    for (fold, size) in report.fold_sizes.iter().enumerate() {
        lines.push(format!("  fold {fold}: {size} records"));
    }
    if let Some(split) = &report.split {
        lines.push(format!(
            "Fold {}: train={} val={}",
            split.fold,
            split.train_indices.len(),
            split.val_indices.len()
        ));
        lines.push(format!("  val indices: {:?}", split.val_indices));
    }
    lines.join("\n")
}

pub fn run_folds(args: FoldsArgs, level: LogLevel) -> Result<(), String> {
    log(
        level,
        LogLevel::Verbose,
        &format!("Loading dataset: {}", args.data.display()),
    );

    let options = CsvOptions::default().text_column(&args.text_column);
    let dataset = data::load(&args.data, &options).map_err(|e| format!("Dataset error: {e}"))?;
    let assignment =
        assign(dataset.len(), args.k_fold, args.seed).map_err(|e| e.to_string())?;
    let report = FoldsReport::new(&assignment, args.fold)?;

    match args.format {
        OutputFormat::Text => log(level, LogLevel::Normal, &format_report(&report)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| format!("JSON serialization error: {e}"))?;
            println!("{json}");
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(&report)
                .map_err(|e| format!("YAML serialization error: {e}"))?;
            println!("{yaml}");
        }
    }

    Ok(())
}
