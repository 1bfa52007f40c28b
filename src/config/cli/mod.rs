//! CLI argument parsing
//!
//! # Usage
//!
//! ```bash
//! toxicity-cv folds data/train.csv --k-fold 5 --seed 42
//! toxicity-cv compose configs/base.yaml configs/roberta.yaml --set model.lr=1e-5
//! toxicity-cv validate configs/base.yaml --set k_fold=10
//! toxicity-cv run configs/base.yaml --all-folds --output-dir outputs
//! ```

mod core;
mod types;

pub use core::{parse_args, Cli, Command, ComposeArgs, FoldsArgs, RunArgs, ValidateArgs};
pub use types::OutputFormat;
