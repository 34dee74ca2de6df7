//! Dependency Graph CLI
//!
//! Scans a Salesforce DX project and writes its dependency graph.
//!
//! Usage:
//!   dependency-graph /path/to/project
//!   dependency-graph /path/to/project --lwc --aura
//!   dependency-graph /path/to/project --all --format json --output graph.json

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::Context;
use clap::Parser;
use sfdx_dependency_graph::{
    analyze, render, ArtifactKind, Format, GraphConfig, RenderOptions, Scope,
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dependency-graph")]
#[command(about = "Draw the dependency graph of a Salesforce DX project")]
struct Cli {
    /// Project folder (or its force-app / source folder)
    project: PathBuf,

    /// Graph triggers
    #[arg(long)]
    trigger: bool,

    /// Graph Aura components
    #[arg(long)]
    aura: bool,

    /// Graph Lightning web components
    #[arg(long)]
    lwc: bool,

    /// Graph flows
    #[arg(long)]
    flow: bool,

    /// Graph Visualforce pages and components
    #[arg(long, alias = "visualforce")]
    vf: bool,

    /// Graph workflow rules and actions
    #[arg(long)]
    workflow: bool,

    /// Graph every kind
    #[arg(long)]
    all: bool,

    /// Output file (default from config: dependencyGraph.html)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<Format>,

    /// Do not open the result afterwards
    #[arg(long)]
    no_open: bool,

    /// Config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn scope(&self) -> Scope {
        if self.all {
            return Scope::all();
        }
        let flags = [
            (self.trigger, ArtifactKind::Trigger),
            (self.aura, ArtifactKind::AuraComponent),
            (self.lwc, ArtifactKind::LightningComponent),
            (self.vf, ArtifactKind::VisualforcePage),
            (self.flow, ArtifactKind::Flow),
            (self.workflow, ArtifactKind::WorkflowEntry),
        ];
        Scope::of(flags.into_iter().filter(|(on, _)| *on).map(|(_, kind)| kind))
    }
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("sfdx_dependency_graph=debug,dependency_graph=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = GraphConfig::load_from(cli.config.as_deref()).context("loading configuration")?;
    let scope = cli.scope();
    let format = cli.format.unwrap_or(config.output.format);
    let output = cli.output.clone().unwrap_or_else(|| default_output(&config, format));

    println!("🔍 Scanning {} for {} dependencies", cli.project.display(), scope.heading());
    let analysis = analyze(&cli.project, scope, &config)?;

    let Some(model) = analysis.model else {
        println!(
            "No items found for the selected types in {}",
            analysis.project.project_dir.display()
        );
        return Ok(());
    };

    println!(
        "📊 {} items, {} references ({} artifacts scanned)",
        model.nodes.len(),
        model.edges.len(),
        analysis.map.registered_count()
    );
    for cycle in &model.cycles {
        warn!("Circular dependency: {}", cycle.join(" -> "));
    }

    let options = RenderOptions::new(
        analysis.project.project_dir.display().to_string(),
        config.graph.direction.clone(),
    );
    let content = render(&model, format, &options)?;
    std::fs::write(&output, content).with_context(|| format!("writing {}", output.display()))?;
    info!("Wrote {}", output.display());
    println!("✅ File {} written successfully", output.display());

    if format == Format::Html && config.output.open_browser && !cli.no_open {
        open_in_browser(&output);
    }
    Ok(())
}

/// Configured path, with its extension following the chosen format
fn default_output(config: &GraphConfig, format: Format) -> PathBuf {
    let path = &config.output.path;
    if format == config.output.format {
        return path.clone();
    }
    path.with_extension(format.extension())
}

/// Spawn the platform opener without waiting for it
fn open_in_browser(path: &Path) {
    let target = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

    let mut command = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else {
        Command::new("xdg-open")
    };

    match command
        .arg(&target)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(_) => println!(
            "The dependency graph should now display on the browser (scroll down if needed)"
        ),
        Err(err) => debug!("Could not open {}: {}", target.display(), err),
    }
}
