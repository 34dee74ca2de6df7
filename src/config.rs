//! Configuration for dependency graph runs
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (dependency-graph.toml)
//! - The platform config directory
//! - Environment variables (DEPGRAPH__<SECTION>__<KEY>)
//!
//! ## Example config file (dependency-graph.toml):
//! ```toml
//! [project]
//! source_layout = "force-app/main/default"
//!
//! [graph]
//! high_fan_out_threshold = 6
//! direction = "LR"
//!
//! [output]
//! path = "dependencyGraph.html"
//! format = "html"
//! open_browser = true
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::graph::classify::DEFAULT_HIGH_FAN_OUT_THRESHOLD;
use crate::project::DEFAULT_SOURCE_LAYOUT;
use crate::render::Format;

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Project layout settings
    #[serde(default)]
    pub project: ProjectConfig,

    /// Ordering and partitioning settings
    #[serde(default)]
    pub graph: GraphSettings,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Project configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Source directory below the project folder
    #[serde(default = "default_source_layout")]
    pub source_layout: String,
}

/// Graph configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSettings {
    /// Outgoing references at which a node moves to the high fan-out bucket
    #[serde(default = "default_threshold")]
    pub high_fan_out_threshold: usize,

    /// Layout direction (LR, TB, RL, BT)
    #[serde(default = "default_direction")]
    pub direction: String,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// File the graph is written to
    #[serde(default = "default_output_path")]
    pub path: PathBuf,

    #[serde(default)]
    pub format: Format,

    /// Open the written file afterwards
    #[serde(default = "default_true")]
    pub open_browser: bool,
}

// Default value functions
fn default_source_layout() -> String {
    DEFAULT_SOURCE_LAYOUT.to_string()
}

fn default_threshold() -> usize {
    DEFAULT_HIGH_FAN_OUT_THRESHOLD
}

fn default_direction() -> String {
    "LR".to_string()
}

fn default_output_path() -> PathBuf {
    PathBuf::from("dependencyGraph.html")
}

fn default_true() -> bool {
    true
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            source_layout: default_source_layout(),
        }
    }
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            high_fan_out_threshold: default_threshold(),
            direction: default_direction(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            format: Format::default(),
            open_browser: true,
        }
    }
}

impl GraphConfig {
    /// Load configuration from default locations, adding `config_path` as a required file
    pub fn load_from(config_path: Option<&Path>) -> std::result::Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "dependency-graph.toml",
            ".dependency-graph.toml",
            "config/dependency-graph.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(dirs) = directories::ProjectDirs::from("dev", "sfdx", "dependency-graph") {
            let user_config = dirs.config_dir().join("dependency-graph.toml");
            if user_config.exists() {
                builder = builder.add_source(File::from(user_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("DEPGRAPH")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
