//! Policies controlling how the graph treats cycles, missing headers and depth.

use serde::{Deserialize, Serialize};

/// Default bound on traversal depth, shared by construction, staleness
/// checks and tree rendering.
pub const DEFAULT_MAX_DEPTH: usize = 20;

/// What to do when an include chain leads back to a file still being scanned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclePolicy {
    /// Fail with [`DepsError::CircularDependency`](crate::DepsError::CircularDependency).
    #[default]
    Reject,
    /// Link back to the already-cached node and keep going.
    Tolerate,
}

/// What to do when an included header does not exist on disk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPolicy {
    /// Fail with [`DepsError::MissingDependency`](crate::DepsError::MissingDependency).
    #[default]
    Fail,
    /// Drop the include during construction and treat a vanished file as not stale.
    Skip,
}

/// Options for a [`DependencyGraph`](crate::DependencyGraph).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraphOptions {
    /// Nodes at this depth or deeper are rejected (the root is depth 0).
    pub max_depth: usize,
    /// Cycle handling during construction.
    pub cycles: CyclePolicy,
    /// Missing-header handling during construction and staleness checks.
    pub missing: MissingPolicy,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            cycles: CyclePolicy::default(),
            missing: MissingPolicy::default(),
        }
    }
}
