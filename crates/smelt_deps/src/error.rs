//! Error types for dependency graph construction and traversal.

use std::path::{Path, PathBuf};

/// Result alias for dependency graph operations.
pub type DepsResult<T> = Result<T, DepsError>;

/// Errors raised while building or traversing a [`DependencyGraph`](crate::DependencyGraph).
///
/// None of these are retried. The caller decides whether to abort the whole
/// build or skip the affected translation unit.
#[derive(Debug, thiserror::Error)]
pub enum DepsError {
    /// A file needed by the graph could not be read or inspected.
    #[error("failed to read {path}: {source}")]
    FileRead {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An included header does not exist.
    #[error("missing dependency {path}{}", included_by_suffix(.included_by))]
    MissingDependency {
        /// The header path as resolved from the include directive.
        path: PathBuf,
        /// The file containing the include directive, when known.
        included_by: Option<PathBuf>,
    },

    /// A file includes itself, directly or through other headers.
    #[error("circular dependency detected: {}", format_cycle(.cycle))]
    CircularDependency {
        /// The include chain, starting and ending with the repeated file.
        cycle: Vec<PathBuf>,
    },

    /// A traversal went deeper than the configured bound.
    #[error("max depth of {limit} exceeded for dependencies at {path} (depth {depth})")]
    MaxDepthExceeded {
        /// The file that would have been visited beyond the bound.
        path: PathBuf,
        /// Depth at which `path` was reached; the root is depth 0.
        depth: usize,
        /// The configured depth bound.
        limit: usize,
    },
}

impl DepsError {
    pub(crate) fn file_read(path: &Path, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.to_path_buf(),
            source,
        }
    }
}

fn included_by_suffix(included_by: &Option<PathBuf>) -> String {
    match included_by {
        Some(parent) => format!(" (included from {})", parent.display()),
        None => String::new(),
    }
}

fn format_cycle(cycle: &[PathBuf]) -> String {
    cycle
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}
