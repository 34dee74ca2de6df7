//! Output formats for a [`RenderModel`]

pub mod dot;
pub mod mermaid;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::graph::RenderModel;

/// Output format
///
/// Config files and environment variables accept any case plus the
/// `mermaid` and `graphviz` aliases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Format {
    /// Mermaid diagram in a standalone HTML page
    #[default]
    #[value(alias = "mermaid")]
    Html,
    /// GraphViz digraph
    #[value(alias = "graphviz")]
    Dot,
    /// The render model as JSON
    Json,
}

impl Format {
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Html => "html",
            Format::Dot => "dot",
            Format::Json => "json",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for Format {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "html" | "mermaid" => Ok(Format::Html),
            "dot" | "graphviz" => Ok(Format::Dot),
            "json" => Ok(Format::Json),
            other => Err(GraphError::UnknownFormat(other.to_string())),
        }
    }
}

impl TryFrom<String> for Format {
    type Error = GraphError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Run details shown alongside the graph
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Project folder, layout stripped
    pub project: String,
    /// Mermaid / GraphViz direction: LR, TB, RL or BT
    pub direction: String,
    pub generated_at: DateTime<Utc>,
}

impl RenderOptions {
    pub fn new(project: impl Into<String>, direction: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            direction: direction.into(),
            generated_at: Utc::now(),
        }
    }

    /// `"<kinds> Dependency Graph for <project>"`
    pub fn title(&self, model: &RenderModel) -> String {
        format!("{} Dependency Graph for {}", model.heading, self.project)
    }
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    title: String,
    project: &'a str,
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    model: &'a RenderModel,
}

/// Render `model` in `format`
pub fn render(model: &RenderModel, format: Format, options: &RenderOptions) -> Result<String> {
    match format {
        Format::Html => Ok(mermaid::to_html(model, options)),
        Format::Dot => Ok(dot::to_dot(model, options)),
        Format::Json => to_json(model, options),
    }
}

pub fn to_json(model: &RenderModel, options: &RenderOptions) -> Result<String> {
    let document = JsonDocument {
        title: options.title(model),
        project: &options.project,
        generated_at: options.generated_at,
        model,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Identifier safe for both Mermaid and GraphViz
pub(crate) fn node_id(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}
