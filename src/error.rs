//! Error types for dependency graph generation

use std::path::PathBuf;

use thiserror::Error;

/// Result type for graph operations
pub type Result<T> = std::result::Result<T, GraphError>;

/// Dependency graph errors
///
/// Missing folders or files are not errors: discovery and body resolution
/// treat them as empty results. Only a project root that cannot be mapped
/// onto the source layout aborts a run.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Project folder not found: {path}")]
    ProjectNotFound { path: PathBuf },

    #[error("Choose a folder containing project files: {path} does not resolve to {expected}")]
    InvalidLayout { path: PathBuf, expected: String },

    #[error("Unknown output format: {0}")]
    UnknownFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("TOML error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}
