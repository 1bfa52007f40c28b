//! Validate command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{validate_config, ExperimentConfig, ValidateArgs};

/// Format cross-validation settings as a string
pub fn format_fold_info(config: &ExperimentConfig) -> String {
    format!(
        "  Folds: {} (current: {})\n  Seed: {}",
        config.k_fold, config.current_fold, config.seed
    )
}

/// Format data configuration as a string
pub fn format_data_info(config: &ExperimentConfig) -> String {
    let dm = &config.datamodule;
    let mut lines = vec![
        format!("  Training data: {}", dm.train_path.display()),
        format!("  Text column: {}", dm.text_column),
    ];
    if !dm.target_columns.is_empty() {
        lines.push(format!("  Targets: {}", dm.target_columns.join(", ")));
    }
    lines.push(format!(
        "  Batch size: {} (val {})",
        dm.batch_size,
        dm.effective_val_batch_size()
    ));
    if let Some(max_length) = dm.max_length {
        lines.push(format!("  Max length: {max_length}"));
    }
    lines.join("\n")
}

/// Format model configuration as a string
pub fn format_model_info(config: &ExperimentConfig) -> String {
    let model = &config.model;
    let mut lines = vec![
        format!("  Model: {}", model.pretrained),
        format!("  Loss: {}", model.loss),
        format!("  Learning rate: {}", model.lr),
        format!("  Weight decay: {}", model.weight_decay),
    ];
    if let Some(scheduler) = &model.scheduler {
        lines.push(format!("  Scheduler: {scheduler}"));
    }
    if model.layerwise_lr_decay {
        lines.push(format!("  Layer-wise LR decay: {}", model.lr_decay_factor));
    }
    lines.join("\n")
}

/// Print detailed configuration summary
pub fn print_detailed_summary(config: &ExperimentConfig) {
    println!();
    println!("Configuration Summary:");
    if let Some(name) = &config.name {
        println!("  Name: {name}");
    }
    println!("{}", format_fold_info(config));
    println!();
    println!("{}", format_data_info(config));
    println!();
    println!("{}", format_model_info(config));
    println!();
    println!("  Epochs: {}", config.trainer.max_epochs);
}

pub fn run_validate(args: ValidateArgs, level: LogLevel) -> Result<(), String> {
    let names: Vec<String> = args
        .configs
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    log(
        level,
        LogLevel::Normal,
        &format!("Validating config: {}", names.join(" + ")),
    );

    let (_, config) = ExperimentConfig::load(&args.configs, &args.overrides)
        .map_err(|e| format!("Config error: {e}"))?;

    validate_config(&config).map_err(|e| format!("Validation failed: {e}"))?;

    log(level, LogLevel::Normal, "Configuration is valid");

    if args.detailed {
        print_detailed_summary(&config);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigTree;

    fn config() -> ExperimentConfig {
        let tree = ConfigTree::from_yaml_str(
            "name: jigsaw\nk_fold: 5\ncurrent_fold: 1\ndatamodule:\n  train_path: data/train.csv\n  target_columns: [y]\n  max_length: 256\nmodel:\n  scheduler: ReduceLROnPlateau\n  layerwise_lr_decay: true\n",
            "test",
        )
        .unwrap();
        ExperimentConfig::from_tree(&tree).unwrap()
    }

    #[test]
    fn test_format_fold_info() {
        let info = format_fold_info(&config());
        assert!(info.contains("Folds: 5 (current: 1)"));
        assert!(info.contains("Seed: 42"));
    }

    #[test]
    fn test_format_data_info() {
        let info = format_data_info(&config());
        assert!(info.contains("data/train.csv"));
        assert!(info.contains("Targets: y"));
        assert!(info.contains("Batch size: 16 (val 16)"));
        assert!(info.contains("Max length: 256"));
    }

    #[test]
    fn test_format_model_info() {
        let info = format_model_info(&config());
        assert!(info.contains("roberta-base"));
        assert!(info.contains("Scheduler: ReduceLROnPlateau"));
        assert!(info.contains("Layer-wise LR decay: 0.7"));
    }
}
