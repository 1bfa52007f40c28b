//! CLI command implementations

mod compose;
mod folds;
mod run;
mod validate;


use crate::cli::LogLevel;
use crate::config::{Cli, Command};

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> Result<(), String> {
    let log_level = LogLevel::from_flags(cli.quiet, cli.verbose);

    match cli.command {
        Command::Folds(args) => folds::run_folds(args, log_level),
        Command::Compose(args) => compose::run_compose(args, log_level),
        Command::Validate(args) => validate::run_validate(args, log_level),
        Command::Run(args) => run::run_run(args, log_level),
    }
}
