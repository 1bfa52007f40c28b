//! Core CLI types - Cli, Command, and argument structs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::types::OutputFormat;
use crate::fold::DEFAULT_SEED;

/// Toxicity CV: cross-validation fold partitioning and experiment config composition
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "toxicity-cv")]
#[command(author = "PAIML")]
#[command(version)]
#[command(
    about = "Seeded k-fold partitioning and layered experiment configs for toxicity fine-tuning"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Assign the records of a CSV dataset to k folds
    Folds(FoldsArgs),

    /// Compose layered YAML configs and print the result
    Compose(ComposeArgs),

    /// Validate a composed experiment configuration
    Validate(ValidateArgs),

    /// Prepare a cross-validation run: folds, splits and tracking
    Run(RunArgs),
}

/// Arguments for the folds command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct FoldsArgs {
    /// Path to the CSV dataset
    #[arg(value_name = "DATA")]
    pub data: PathBuf,

    /// Number of folds
    #[arg(short, long, default_value_t = 5)]
    pub k_fold: usize,

    /// Shuffle seed
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Only report the split for this fold
    #[arg(short, long)]
    pub fold: Option<usize>,

    /// Name of the text column
    #[arg(long, default_value = "text")]
    pub text_column: String,

    /// Output format (text, json, yaml)
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the compose command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ComposeArgs {
    /// Config files, merged left to right
    #[arg(value_name = "CONFIG", required = true)]
    pub configs: Vec<PathBuf>,

    /// Dotted override, e.g. `model.lr=1e-5` (repeatable)
    #[arg(short = 's', long = "set", value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,

    /// Print `${...}` references unresolved
    #[arg(long)]
    pub no_resolve: bool,

    /// Top-level fields to print, in order (repeatable)
    #[arg(long = "field", value_name = "FIELD")]
    pub fields: Vec<String>,

    /// Directory `config_tree.log` is written to
    #[arg(long, default_value = ".")]
    pub log_dir: PathBuf,
}

/// Arguments for the validate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ValidateArgs {
    /// Config files, merged left to right
    #[arg(value_name = "CONFIG", required = true)]
    pub configs: Vec<PathBuf>,

    /// Dotted override, e.g. `k_fold=10` (repeatable)
    #[arg(short = 's', long = "set", value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,

    /// Show the resolved settings after validation
    #[arg(short, long)]
    pub detailed: bool,
}

/// Arguments for the run command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct RunArgs {
    /// Config files, merged left to right
    #[arg(value_name = "CONFIG", required = true)]
    pub configs: Vec<PathBuf>,

    /// Dotted override, e.g. `current_fold=3` (repeatable)
    #[arg(short = 's', long = "set", value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,

    /// Prepare every fold instead of only `current_fold`
    #[arg(long)]
    pub all_folds: bool,

    /// Directory for folds.json, config_tree.log and tracked runs
    #[arg(short, long, default_value = "outputs")]
    pub output_dir: PathBuf,

    /// Validate and split without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Parse CLI arguments from an iterator (for testing)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}
