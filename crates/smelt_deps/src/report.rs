//! Serializable summary of the files reachable from a root.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::Serialize;

use crate::graph::DependencyGraph;
use crate::node::NodeId;

/// Flat listing of every file reachable from a root, for machine consumption.
#[derive(Debug, Clone, Serialize)]
pub struct DependencyReport {
    /// The file the report was generated for.
    pub root: PathBuf,
    /// Each reachable file once, in depth-first include order.
    pub files: Vec<FileEntry>,
}

/// One file in a [`DependencyReport`].
#[derive(Debug, Clone, Serialize)]
pub struct FileEntry {
    /// Canonical path of the file.
    pub path: PathBuf,
    /// Paths of the files it directly includes.
    pub dependencies: Vec<PathBuf>,
}

impl DependencyGraph {
    /// Collects every file reachable from `root`, each listed once.
    ///
    /// Unlike [`render`](DependencyGraph::render) this never repeats a file,
    /// so it also terminates on tolerated cycles.
    pub fn report(&self, root: NodeId) -> DependencyReport {
        let mut files = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![root];

        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            let node = self.node(id);
            files.push(FileEntry {
                path: node.path().to_path_buf(),
                dependencies: node
                    .dependencies()
                    .iter()
                    .map(|&dep| self.node(dep).path().to_path_buf())
                    .collect(),
            });
            stack.extend(node.dependencies().iter().rev().copied());
        }

        DependencyReport {
            root: self.node(root).path().to_path_buf(),
            files,
        }
    }
}
