//! Include-dependency tracking for incremental C/C++ builds.
//!
//! This crate builds a memoized graph of source and header files by scanning
//! local `#include "..."` directives, and answers whether a translation unit
//! or anything it transitively includes was modified after a given object
//! file timestamp. One [`DependencyGraph`] is created per build invocation and
//! shared by every translation unit of that build.

#![warn(missing_docs)]

pub mod error;
pub mod graph;
pub mod node;
pub mod options;
pub mod render;
pub mod report;
pub mod scan;
pub mod staleness;

pub use error::{DepsError, DepsResult};
pub use graph::DependencyGraph;
pub use node::{FileNode, NodeId};
pub use options::{CyclePolicy, GraphOptions, MissingPolicy, DEFAULT_MAX_DEPTH};
pub use render::render_tree;
pub use report::{DependencyReport, FileEntry};
pub use staleness::file_mtime;

pub use filetime::FileTime;
