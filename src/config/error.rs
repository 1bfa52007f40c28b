//! Errors from composing and resolving experiment configuration

use std::path::PathBuf;

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML in {origin}: {message}")]
    Parse { origin: String, message: String },

    #[error("Config root in {0} must be a mapping")]
    NotAMapping(String),

    #[error("Invalid override '{expr}': {reason}")]
    InvalidOverride { expr: String, reason: String },

    #[error("Interpolation ${{{reference}}} in '{key}' refers to a missing key")]
    MissingReference { key: String, reference: String },

    #[error("Environment variable '{var}' referenced by '{key}' is not set")]
    MissingEnvVar { key: String, var: String },

    #[error("Cyclic interpolation: {}", .chain.join(" -> "))]
    CyclicReference { chain: Vec<String> },

    #[error("Unterminated interpolation in '{key}': {value}")]
    UnterminatedReference { key: String, value: String },

    #[error("Cannot embed non-scalar ${{{reference}}} inside the string value of '{key}'")]
    NonScalarInterpolation { key: String, reference: String },

    #[error("Invalid experiment config: {0}")]
    Deserialize(String),

    #[error(
        "Running in experiment mode without an experiment name\n  → Pass name=<experiment_name> as an override"
    )]
    MissingExperimentName,
}

/// Result alias for config operations
pub type Result<T> = std::result::Result<T, ConfigError>;
