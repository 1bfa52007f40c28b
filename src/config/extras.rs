//! Run-time adjustments derived from the composed config

use super::error::{ConfigError, Result};
use super::schema::ExperimentConfig;

/// What [`apply_extras`] changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Extras {
    /// `ignore_warnings` was set
    pub warnings_disabled: bool,
    /// `trainer.fast_dev_run` forced a debugger-friendly setup
    pub debug_forced: bool,
}

/// Apply the optional utilities controlled by top-level flags
///
/// - `ignore_warnings`: reported so the caller can lower warning output
/// - `experiment_mode` without `name`: rejected
/// - `trainer.fast_dev_run`: forces `gpus = 0`, `pin_memory = false` and
///   `num_workers = 0`
pub fn apply_extras(config: &mut ExperimentConfig) -> Result<Extras> {
    let mut extras = Extras::default();

    if config.ignore_warnings {
        tracing::info!("Disabling warnings! <config.ignore_warnings=True>");
        extras.warnings_disabled = true;
    }

    let has_name = config.name.as_deref().is_some_and(|n| !n.trim().is_empty());
    if config.experiment_mode && !has_name {
        return Err(ConfigError::MissingExperimentName);
    }

    if config.trainer.fast_dev_run {
        tracing::info!(
            "Forcing debugger friendly configuration! <config.trainer.fast_dev_run=True>"
        );
        config.trainer.gpus = 0;
        config.datamodule.pin_memory = false;
        config.datamodule.num_workers = 0;
        extras.debug_forced = true;
    }

    Ok(extras)
}
