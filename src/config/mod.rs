//! Experiment configuration
//!
//! Configs are plain YAML files layered left to right into a [`ConfigTree`],
//! adjusted with dotted command-line overrides and resolved for `${...}`
//! interpolations before being deserialized into an [`ExperimentConfig`].

mod cli;
mod error;
mod extras;
mod interpolate;
mod render;
mod schema;
mod tree;
mod validate;

pub use cli::{
    parse_args, Cli, Command, ComposeArgs, FoldsArgs, OutputFormat, RunArgs, ValidateArgs,
};
pub use error::{ConfigError, Result};
pub use extras::{apply_extras, Extras};
pub use render::{render_config_tree, CONFIG_TREE_LOG, DEFAULT_FIELDS};
pub use schema::{DataModuleConfig, ExperimentConfig, ModelConfig, TrainerConfig};
pub use tree::ConfigTree;
pub use validate::{validate_config, ValidationError};
