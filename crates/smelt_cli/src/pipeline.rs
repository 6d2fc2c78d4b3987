//! Shared pipeline helpers for CLI commands.
//!
//! Contains the project loading, source discovery and path derivation used by
//! `build`, `clean` and `deps`.

use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use smelt_config::{ProjectConfig, CONFIG_FILE};
use tracing::debug;
use walkdir::WalkDir;

use crate::GlobalArgs;

/// Separators in paths must be matched by literal separators in patterns.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A project root together with its configuration.
pub struct Project {
    /// Directory containing `smelt.toml` (or the working directory).
    pub root: PathBuf,
    /// The loaded configuration.
    pub config: ProjectConfig,
}

impl Project {
    /// Configured project name, or the root directory's name.
    pub fn name(&self) -> String {
        if !self.config.project.name.is_empty() {
            return self.config.project.name.clone();
        }
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string())
    }

    /// Absolute-or-root-relative path of the configured main file.
    pub fn main_path(&self) -> PathBuf {
        self.root.join(&self.config.project.main)
    }

    /// Returns `path` relative to the project root for display.
    pub fn display_path<'a>(&self, path: &'a Path) -> std::path::Display<'a> {
        path.strip_prefix(&self.root).unwrap_or(path).display()
    }
}

/// Walks up from `start` looking for the nearest directory containing `smelt.toml`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).exists() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Resolves the project root and loads its configuration.
///
/// If `--config` is specified, uses that path (file → parent dir, dir →
/// itself) and requires a `smelt.toml` there. Otherwise walks up from the
/// current directory; without a `smelt.toml` anywhere, the current directory
/// is built with the default configuration.
pub fn load_project(global: &GlobalArgs) -> Result<Project, Box<dyn std::error::Error>> {
    if let Some(ref config_path) = global.config {
        let p = PathBuf::from(config_path);
        let root = if p.is_file() {
            p.parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."))
        } else {
            p
        };
        let root = std::path::absolute(&root)?;
        let config = smelt_config::load_config(&root)?;
        return Ok(Project { root, config });
    }

    let cwd = std::env::current_dir()?;
    match find_project_root(&cwd) {
        Some(root) => {
            let config = smelt_config::load_config(&root)?;
            Ok(Project { root, config })
        }
        None => {
            debug!(root = %cwd.display(), "no {CONFIG_FILE} found, using defaults");
            let config = smelt_config::load_config_or_default(&cwd)?;
            Ok(Project { root: cwd, config })
        }
    }
}

/// Compiled exclude globs, matched against the trailing components of a
/// root-relative path.
#[derive(Debug, Default)]
pub struct ExcludeSet {
    patterns: Vec<Pattern>,
}

impl ExcludeSet {
    /// Compiles `patterns`. A pattern ending in `/` covers everything below
    /// that directory.
    pub fn new(patterns: &[String]) -> Result<Self, glob::PatternError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                if p.ends_with('/') {
                    Pattern::new(&format!("{p}**"))
                } else {
                    Pattern::new(p)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Returns `true` if any pattern matches `relative` or one of its
    /// trailing sub-paths (`a/b/c.cpp`, `b/c.cpp`, `c.cpp`).
    pub fn is_excluded(&self, relative: &Path) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        let components: Vec<_> = relative.components().collect();
        (0..components.len()).any(|start| {
            let suffix: PathBuf = components[start..].iter().collect();
            self.patterns
                .iter()
                .any(|p| p.matches_path_with(&suffix, MATCH_OPTIONS))
        })
    }
}

/// Recursively discovers files under `root` whose extension is one of
/// `extensions`, skipping excluded paths. Returned paths are rooted at
/// `root` and sorted.
pub fn discover_files(
    root: &Path,
    extensions: &[String],
    excludes: &ExcludeSet,
) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let matches_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| extensions.iter().any(|want| want == ext));
        if !matches_ext {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        if excludes.is_excluded(relative) {
            debug!(path = %relative.display(), "excluded");
            continue;
        }
        files.push(path.to_path_buf());
    }
    files.sort();
    Ok(files)
}

/// Object file written for a translation unit: the source with `.o`.
pub fn object_path(source: &Path) -> PathBuf {
    source.with_extension("o")
}

/// Executable produced from the main file: the main file without extension.
pub fn executable_path(main: &Path) -> PathBuf {
    main.with_extension("")
}
