//! Human-readable rendering of a dependency tree.

use std::path::Path;

use crate::error::{DepsError, DepsResult};
use crate::graph::DependencyGraph;
use crate::node::NodeId;

impl DependencyGraph {
    /// Renders the tree below `root` using this graph's depth bound.
    pub fn render(&self, root: NodeId) -> DepsResult<Vec<String>> {
        render_tree(self, root, self.options().max_depth)
    }
}

/// Renders the tree below `root`, one line per visited file.
///
/// Lines are indented two spaces per level and every non-root line is
/// prefixed with `- `. Headers included from several places appear under
/// each includer. Rendering a file at `depth >= limit` fails with
/// [`DepsError::MaxDepthExceeded`], which is also what a tolerated include
/// cycle runs into.
pub fn render_tree(graph: &DependencyGraph, root: NodeId, limit: usize) -> DepsResult<Vec<String>> {
    let mut lines = Vec::new();
    let mut stack = vec![(root, 0usize)];

    while let Some((id, depth)) = stack.pop() {
        let node = graph.node(id);
        if depth >= limit {
            return Err(DepsError::MaxDepthExceeded {
                path: node.path().to_path_buf(),
                depth,
                limit,
            });
        }
        lines.push(render_line(node.path(), depth));
        stack.extend(node.dependencies().iter().rev().map(|&dep| (dep, depth + 1)));
    }

    Ok(lines)
}

fn render_line(path: &Path, depth: usize) -> String {
    let marker = if depth > 0 { "- " } else { "" };
    format!("{}{}{}", "  ".repeat(depth), marker, path.display())
}
