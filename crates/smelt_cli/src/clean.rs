//! `smelt clean` — remove build outputs.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::pipeline::{discover_files, executable_path, load_project, ExcludeSet};
use crate::GlobalArgs;

/// Runs the `smelt clean` command.
///
/// Removes every object file under the project root that is not excluded,
/// and the main executable. Returns exit code 0.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;
    let excludes = ExcludeSet::new(&project.config.project.excludes)?;
    let executable = executable_path(&project.main_path());

    let removed = remove_outputs(&project.root, &excludes, &executable)?;
    if !global.quiet {
        for path in &removed {
            eprintln!("     Removed {}", project.display_path(path));
        }
        eprintln!("    Cleaned {} file(s)", removed.len());
    }
    Ok(0)
}

/// Deletes object files under `root` and `executable`, returning what was removed.
pub fn remove_outputs(
    root: &Path,
    excludes: &ExcludeSet,
    executable: &Path,
) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut removed = Vec::new();
    for object in discover_files(root, &["o".to_string()], excludes)? {
        std::fs::remove_file(&object)?;
        debug!(path = %object.display(), "removed object file");
        removed.push(object);
    }
    if executable.is_file() {
        std::fs::remove_file(executable)?;
        debug!(path = %executable.display(), "removed executable");
        removed.push(executable.to_path_buf());
    }
    Ok(removed)
}
