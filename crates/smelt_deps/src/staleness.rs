//! Modification-time staleness checks over the dependency graph.

use std::collections::HashSet;
use std::path::Path;

use filetime::FileTime;
use tracing::{debug, warn};

use crate::error::{DepsError, DepsResult};
use crate::graph::DependencyGraph;
use crate::node::NodeId;
use crate::options::MissingPolicy;

/// Returns the last modification time of `path`.
pub fn file_mtime(path: &Path) -> std::io::Result<FileTime> {
    let meta = std::fs::metadata(path)?;
    Ok(FileTime::from_last_modification_time(&meta))
}

impl DependencyGraph {
    /// Returns `true` if `root` or any file it transitively includes was
    /// modified strictly after `reference`.
    ///
    /// Files are visited depth-first in include order and the walk stops at
    /// the first newer file. A header reachable along several paths is only
    /// checked once per call.
    pub fn is_stale_after(&self, root: NodeId, reference: FileTime) -> DepsResult<bool> {
        self.is_stale_after_within(root, reference, self.options().max_depth)
    }

    /// Like [`is_stale_after`](Self::is_stale_after), but fails with
    /// [`DepsError::MaxDepthExceeded`] when a file is reached at
    /// `depth >= limit` instead of using the graph's own bound.
    pub fn is_stale_after_within(
        &self,
        root: NodeId,
        reference: FileTime,
        limit: usize,
    ) -> DepsResult<bool> {
        let mut visited = HashSet::new();
        let mut stack = vec![(root, 0usize)];

        while let Some((id, depth)) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let node = self.node(id);
            if depth >= limit {
                return Err(DepsError::MaxDepthExceeded {
                    path: node.path().to_path_buf(),
                    depth,
                    limit,
                });
            }

            if let Some(mtime) = self.modified_time(node.path())? {
                if mtime > reference {
                    debug!(path = %node.path().display(), "modified after reference time");
                    return Ok(true);
                }
            }

            stack.extend(node.dependencies().iter().rev().map(|&dep| (dep, depth + 1)));
        }

        Ok(false)
    }

    /// Stats `path`; `None` means the file vanished and the skip policy applies.
    fn modified_time(&self, path: &Path) -> DepsResult<Option<FileTime>> {
        match file_mtime(path) {
            Ok(mtime) => Ok(Some(mtime)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => match self.options().missing {
                MissingPolicy::Fail => Err(DepsError::MissingDependency {
                    path: path.to_path_buf(),
                    included_by: None,
                }),
                MissingPolicy::Skip => {
                    warn!(path = %path.display(), "dependency no longer exists, treating as unchanged");
                    Ok(None)
                }
            },
            Err(e) => Err(DepsError::file_read(path, e)),
        }
    }
}
