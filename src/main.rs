//! toxicity-cv CLI
//!
//! # Usage
//!
//! ```bash
//! # Inspect the fold layout of a dataset
//! toxicity-cv folds data/train.csv --k-fold 5 --seed 42
//!
//! # Compose layered configs with overrides
//! toxicity-cv compose configs/base.yaml configs/roberta.yaml --set model.lr=1e-5
//!
//! # Validate a config
//! toxicity-cv validate configs/base.yaml --set current_fold=4
//!
//! # Prepare every fold of an experiment
//! toxicity-cv run configs/base.yaml --all-folds --output-dir outputs
//! ```

use clap::Parser;
use std::process::ExitCode;
use toxicity_cv::cli::{run_command, Cli, LogLevel};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = LogLevel::from_flags(cli.quiet, cli.verbose);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.filter_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
