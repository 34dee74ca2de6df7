//! Salesforce DX Dependency Graph
//!
//! Static, lexical dependency extraction over a Salesforce DX project:
//! Apex classes and triggers, Aura and Lightning web components,
//! Visualforce pages, flows and workflow rules.
//!
//! ## Features
//!
//! - **Artifact Registry**: one declarative entry per artifact kind
//! - **Discovery**: conventional folder layout, test and sidecar filtering
//! - **Body Resolution**: companion scripts, per-section workflow extraction
//! - **Reference Detection**: per-kind pattern rules producing member tokens
//! - **Cross-Reference Map**: arena store with reference counts and member sets
//! - **Rendering**: Mermaid HTML, GraphViz DOT, JSON
//!
//! ## Architecture
//!
//! ```text
//! force-app/main/default/
//! ├── classes/      *.cls
//! ├── triggers/     *.trigger
//! ├── aura/<name>/  <name>.cmp + <name>Controller.js + <name>Helper.js
//! ├── lwc/<name>/   <name>.html + <name>.js
//! ├── pages/        *.page
//! ├── components/   *.component
//! ├── flows/        *.flow-meta.xml
//! └── workflows/    *.workflow-meta.xml  (one entry per section)
//! ```
//!
//! ```no_run
//! use std::path::Path;
//! use sfdx_dependency_graph::{analyze, GraphConfig, Scope};
//!
//! let analysis = analyze(Path::new("."), Scope::classes(), &GraphConfig::default())?;
//! if let Some(model) = analysis.model {
//!     println!("{} nodes", model.nodes.len());
//! }
//! # Ok::<(), sfdx_dependency_graph::GraphError>(())
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod project;
pub mod registry;
pub mod render;
pub mod source;

use std::path::Path;

use tracing::info;

pub use config::GraphConfig;
pub use error::{GraphError, Result};
pub use graph::{
    Artifact, ArtifactId, Bucket, CrossReferenceMap, GraphBuilder, RenderEdge, RenderModel,
    RenderNode, Scope,
};
pub use project::{resolve_project_root, ProjectRoot};
pub use registry::{ArtifactKind, ArtifactRegistry, ArtifactTypeSpec};
pub use render::{render, Format, RenderOptions};
pub use source::{FsSourceTree, MemorySourceTree, SourceTree};

/// Result of one run over a project
#[derive(Debug)]
pub struct Analysis {
    pub project: ProjectRoot,
    pub map: CrossReferenceMap,
    /// `None` when nothing in scope was found
    pub model: Option<RenderModel>,
}

/// Resolve `path`, build the cross-reference map from disk and partition it
pub fn analyze(path: &Path, scope: Scope, config: &GraphConfig) -> Result<Analysis> {
    let project = resolve_project_root(path, &config.project.source_layout)?;
    info!("Analyzing {}", project.source_dir.display());

    let registry = ArtifactRegistry::standard();
    let builder = GraphBuilder::new(registry, scope);
    let map = builder.build(&FsSourceTree, &project.source_dir);
    let model = RenderModel::build(
        &map,
        builder.registry(),
        builder.scope(),
        config.graph.high_fan_out_threshold,
    );

    Ok(Analysis { project, map, model })
}
