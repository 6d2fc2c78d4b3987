//! Nodes of the dependency graph and the handles that refer to them.

use std::path::{Path, PathBuf};

/// Opaque handle to a [`FileNode`] owned by a [`DependencyGraph`](crate::DependencyGraph).
///
/// Within one graph there is exactly one node per canonical path, so two
/// handles are equal exactly when they refer to the same file.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(u32);

impl NodeId {
    /// Creates a `NodeId` from a raw `u32` value.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw `u32` value of this `NodeId`.
    pub fn as_raw(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// One source or header file and the files it directly includes.
#[derive(Debug, Clone)]
pub struct FileNode {
    path: PathBuf,
    dependencies: Vec<NodeId>,
    height: usize,
}

impl FileNode {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self {
            path,
            dependencies: Vec::new(),
            height: 0,
        }
    }

    /// Canonical absolute path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directly included files, in the order their directives appear.
    pub fn dependencies(&self) -> &[NodeId] {
        &self.dependencies
    }

    /// Levels in the include tree rooted at this file, counting the file
    /// itself. Zero while the file is still being scanned.
    pub fn height(&self) -> usize {
        self.height
    }

    pub(crate) fn set_height(&mut self, height: usize) {
        self.height = height;
    }

    pub(crate) fn push_dependency(&mut self, id: NodeId) {
        self.dependencies.push(id);
    }
}
