//! Compose command implementation

use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{render_config_tree, ComposeArgs, ConfigTree, CONFIG_TREE_LOG, DEFAULT_FIELDS};

/// Write a rendered config tree to `config_tree.log` under `dir`
pub(super) fn write_config_tree_log(dir: &Path, rendered: &str) -> std::io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(CONFIG_TREE_LOG);
    fs::write(&path, rendered)?;
    Ok(path)
}

pub fn run_compose(args: ComposeArgs, level: LogLevel) -> Result<(), String> {
    let mut tree = ConfigTree::compose(&args.configs).map_err(|e| format!("Config error: {e}"))?;
    tree.apply_overrides(&args.overrides)
        .map_err(|e| format!("Config error: {e}"))?;

    let fields: Vec<&str> = if args.fields.is_empty() {
        DEFAULT_FIELDS.to_vec()
    } else {
        args.fields.iter().map(String::as_str).collect()
    };

    let rendered = render_config_tree(&tree, &fields, !args.no_resolve)
        .map_err(|e| format!("Config error: {e}"))?;
    log(level, LogLevel::Normal, &rendered);

    let path = write_config_tree_log(&args.log_dir, &rendered)
        .map_err(|e| format!("Failed to write {CONFIG_TREE_LOG}: {e}"))?;
    log(
        level,
        LogLevel::Verbose,
        &format!("Wrote {}", path.display()),
    );

    Ok(())
}
