//! Memoized construction of the include-dependency graph.
//!
//! The [`DependencyGraph`] is both the node arena and the dependency cache:
//! every canonical path maps to exactly one [`FileNode`] for the lifetime of
//! the graph. Construction walks includes depth-first with an explicit stack,
//! so include chains never consume host stack.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};

use crate::error::{DepsError, DepsResult};
use crate::node::{FileNode, NodeId};
use crate::options::{CyclePolicy, GraphOptions, MissingPolicy};
use crate::scan;

/// Dependency cache and node arena for one build invocation.
///
/// Create a fresh graph per build and share it between all translation
/// units of that build so common headers are scanned only once.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    options: GraphOptions,
    nodes: Vec<FileNode>,
    index: HashMap<PathBuf, NodeId>,
}

/// A file whose include directives are still being followed.
struct Frame {
    node: NodeId,
    includes: std::vec::IntoIter<PathBuf>,
}

impl DependencyGraph {
    /// Creates an empty graph with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty graph with the given options.
    pub fn with_options(options: GraphOptions) -> Self {
        Self {
            options,
            nodes: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Returns the options this graph was created with.
    pub fn options(&self) -> &GraphOptions {
        &self.options
    }

    /// Number of distinct files in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no file has been scanned yet.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the node for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this graph.
    pub fn node(&self, id: NodeId) -> &FileNode {
        &self.nodes[id.index()]
    }

    /// Looks up an already-scanned file without scanning it.
    pub fn lookup(&self, path: &Path) -> Option<NodeId> {
        let canonical = path.canonicalize().ok()?;
        self.index.get(&canonical).copied()
    }

    /// Iterates over all nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &FileNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId::from_raw(i as u32), node))
    }

    /// Returns the node for `path`, scanning it and everything it includes
    /// on first use.
    ///
    /// This is the only way nodes come into existence. A path already in the
    /// cache is returned without touching the disk. If construction fails,
    /// every node created by this call is discarded again so the cache only
    /// ever holds fully built nodes.
    pub fn build(&mut self, path: &Path) -> DepsResult<NodeId> {
        let mark = self.nodes.len();
        let result = self.build_from(path);
        if result.is_err() {
            self.rollback(mark);
        }
        result
    }

    fn build_from(&mut self, path: &Path) -> DepsResult<NodeId> {
        let root_path = path
            .canonicalize()
            .map_err(|e| DepsError::file_read(path, e))?;
        if let Some(&id) = self.index.get(&root_path) {
            trace!(path = %root_path.display(), "dependency cache hit");
            return Ok(id);
        }

        let (root, includes) = self.open(root_path)?;
        let mut stack = vec![Frame {
            node: root,
            includes,
        }];

        loop {
            let Some(frame) = stack.last_mut() else {
                break;
            };
            let parent = frame.node;
            let Some(candidate) = frame.includes.next() else {
                stack.pop();
                self.finish(parent);
                continue;
            };

            let Some(child_path) = self.resolve(candidate, parent)? else {
                continue;
            };

            if let Some(&child) = self.index.get(&child_path) {
                if let Some(pos) = stack.iter().position(|f| f.node == child) {
                    match self.options.cycles {
                        CyclePolicy::Reject => {
                            return Err(self.cycle_error(&stack[pos..], child));
                        }
                        CyclePolicy::Tolerate => {
                            debug!(
                                path = %child_path.display(),
                                from = %self.node(parent).path().display(),
                                "circular include, reusing cached node"
                            );
                        }
                    }
                } else {
                    let depth = stack.len();
                    if depth + self.node(child).height() > self.options.max_depth {
                        return Err(self.too_deep(child, depth));
                    }
                    trace!(path = %child_path.display(), "dependency cache hit");
                }
                self.nodes[parent.index()].push_dependency(child);
                continue;
            }

            if stack.len() >= self.options.max_depth {
                return Err(DepsError::MaxDepthExceeded {
                    path: child_path,
                    depth: stack.len(),
                    limit: self.options.max_depth,
                });
            }

            let (child, includes) = self.open(child_path)?;
            self.nodes[parent.index()].push_dependency(child);
            stack.push(Frame {
                node: child,
                includes,
            });
        }

        Ok(root)
    }

    /// Reads `path`, registers its node and returns the include paths to follow.
    fn open(&mut self, path: PathBuf) -> DepsResult<(NodeId, std::vec::IntoIter<PathBuf>)> {
        let bytes = std::fs::read(&path).map_err(|e| DepsError::file_read(&path, e))?;
        let text = String::from_utf8_lossy(&bytes);
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let includes: Vec<PathBuf> = scan::local_includes(&text)
            .into_iter()
            .map(|include| dir.join(include))
            .collect();

        debug!(
            path = %path.display(),
            includes = includes.len(),
            "scanned file"
        );

        let id = NodeId::from_raw(self.nodes.len() as u32);
        self.index.insert(path.clone(), id);
        self.nodes.push(FileNode::new(path));
        Ok((id, includes.into_iter()))
    }

    /// Canonicalizes an include target, applying the missing-header policy.
    fn resolve(&self, candidate: PathBuf, parent: NodeId) -> DepsResult<Option<PathBuf>> {
        match candidate.canonicalize() {
            Ok(path) => Ok(Some(path)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => match self.options.missing {
                MissingPolicy::Fail => Err(DepsError::MissingDependency {
                    path: candidate,
                    included_by: Some(self.node(parent).path().to_path_buf()),
                }),
                MissingPolicy::Skip => {
                    warn!(
                        path = %candidate.display(),
                        from = %self.node(parent).path().display(),
                        "skipping missing header"
                    );
                    Ok(None)
                }
            },
            Err(e) => Err(DepsError::file_read(&candidate, e)),
        }
    }

    /// Records the height of a node whose includes have all been followed.
    /// Back edges to files still under construction count as height 0.
    fn finish(&mut self, id: NodeId) {
        let below = self
            .node(id)
            .dependencies()
            .iter()
            .map(|&dep| self.node(dep).height())
            .max()
            .unwrap_or(0);
        self.nodes[id.index()].set_height(below + 1);
    }

    /// Finds the file a cold walk would have rejected when a cached subtree
    /// starting at `depth` reaches past the bound: the first file, in include
    /// order, that sits at exactly the limit.
    fn too_deep(&self, from: NodeId, depth: usize) -> DepsError {
        let limit = self.options.max_depth;
        let mut id = from;
        let mut depth = depth;
        while depth < limit {
            let need = limit - depth;
            match self
                .node(id)
                .dependencies()
                .iter()
                .copied()
                .find(|&dep| self.node(dep).height() >= need)
            {
                Some(next) => {
                    id = next;
                    depth += 1;
                }
                None => break,
            }
        }
        DepsError::MaxDepthExceeded {
            path: self.node(id).path().to_path_buf(),
            depth,
            limit,
        }
    }

    fn cycle_error(&self, chain: &[Frame], repeated: NodeId) -> DepsError {
        let mut cycle: Vec<PathBuf> = chain
            .iter()
            .map(|f| self.node(f.node).path().to_path_buf())
            .collect();
        cycle.push(self.node(repeated).path().to_path_buf());
        DepsError::CircularDependency { cycle }
    }

    fn rollback(&mut self, mark: usize) {
        for node in self.nodes.drain(mark..) {
            self.index.remove(node.path());
        }
    }
}
