//! `smelt deps` — show the local include tree of a file.

use std::path::{Path, PathBuf};

use smelt_config::ProjectConfig;
use smelt_deps::DependencyGraph;

use crate::pipeline::load_project;
use crate::{DepsArgs, GlobalArgs, ReportFormat};

/// Runs the `smelt deps` command.
///
/// Prints the tree of `args.path` (default: the configured main file) to
/// stdout. Returns exit code 0 on success.
pub fn run(args: &DepsArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;
    let target = match &args.path {
        Some(path) => PathBuf::from(path),
        None => project.main_path(),
    };

    let output = describe(&project.config, &target, args.format)?;
    println!("{output}");
    Ok(0)
}

/// Builds the graph of `target` and formats it as a tree or as JSON.
pub fn describe(
    config: &ProjectConfig,
    target: &Path,
    format: ReportFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    let mut graph = DependencyGraph::with_options(config.graph_options());
    let root = graph.build(target)?;

    match format {
        ReportFormat::Text => Ok(graph.render(root)?.join("\n")),
        ReportFormat::Json => Ok(serde_json::to_string_pretty(&graph.report(root))?),
    }
}
